//! Request and response documents

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{BodyPartId, EmployeeId, ItemId};
use domain_pricing::{InvoiceLineRequest, InvoicePricingResult, InvoiceSummary, PricingResult};

use crate::error::CliError;

/// An invoice to be priced for one employee
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceRequest {
    #[validate(range(min = 1))]
    pub employee_id: i64,
    /// Pricing date; the command line flag wins, then today
    pub as_of: Option<NaiveDate>,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineRequest {
    #[validate(range(min = 1))]
    pub item_id: i64,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub body_part_id: Option<i64>,
    #[validate(custom(function = "validate_unit_price"))]
    pub unit_price: Option<Decimal>,
}

fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_unit_price"));
    }
    Ok(())
}

impl InvoiceRequest {
    /// Reads a request document
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn employee(&self) -> EmployeeId {
        EmployeeId::new(self.employee_id)
    }

    /// Converts the lines into engine requests
    pub fn line_requests(&self) -> Vec<InvoiceLineRequest> {
        self.lines.iter().map(LineRequest::to_engine).collect()
    }
}

impl LineRequest {
    fn to_engine(&self) -> InvoiceLineRequest {
        let mut request = InvoiceLineRequest::new(ItemId::new(self.item_id), self.quantity);
        if let Some(body_part) = self.body_part_id {
            request = request.with_body_part(BodyPartId::new(body_part));
        }
        if let Some(price) = self.unit_price {
            request = request.with_unit_price(price);
        }
        request
    }
}

/// Document printed for a priced invoice
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub employee_id: EmployeeId,
    pub as_of: NaiveDate,
    pub lines: Vec<PricingResult>,
    pub summary: InvoiceSummary,
}

impl InvoiceResponse {
    pub fn new(employee_id: EmployeeId, as_of: NaiveDate, result: InvoicePricingResult) -> Self {
        Self {
            employee_id,
            as_of,
            lines: result.lines,
            summary: result.summary,
        }
    }
}
