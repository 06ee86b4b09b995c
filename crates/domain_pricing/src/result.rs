//! Calculation results
//!
//! `PricingResult` describes one priced line whatever the outcome; an
//! invoice is priced into `InvoicePricingResult`, which pairs the line
//! results with a summary of their totals.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BodyPartId, ConditionId, DiscountId, ItemId};

use crate::discount::{DiscountInfo, DiscountSourceType};

/// How a line ended up being priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageOutcome {
    /// A condition was applied
    Covered,
    /// Coverage was denied; the patient pays the total
    Uncovered,
    /// No condition applied; the price record's default split was used
    DefaultCoverage,
}

impl CoverageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageOutcome::Covered => "covered",
            CoverageOutcome::Uncovered => "uncovered",
            CoverageOutcome::DefaultCoverage => "default_coverage",
        }
    }
}

impl fmt::Display for CoverageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supporting detail for a priced line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingMetadata {
    pub condition_code: Option<String>,
    pub condition_name: Option<String>,
    /// Quantity as requested, before any cap
    pub original_quantity: u32,
    /// Quantity after caps were applied
    pub final_quantity: u32,
    pub discount_source_type: DiscountSourceType,
    pub discount_source_id: Option<DiscountId>,
    pub discount_percentage: Decimal,
}

impl PricingMetadata {
    pub(crate) fn with_discount(mut self, discount: &DiscountInfo) -> Self {
        self.discount_source_type = discount.source_type;
        self.discount_source_id = discount.source_id;
        self.discount_percentage = discount.percentage;
        self
    }
}

/// Priced invoice line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub item_id: ItemId,
    pub outcome: CoverageOutcome,
    pub is_covered: bool,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub insurance_share: Decimal,
    pub patient_share: Decimal,
    pub coverage_percentage: Decimal,
    pub discount_amount: Decimal,
    pub deduction_amount: Decimal,
    pub deduction_reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub applied_condition_id: Option<ConditionId>,
    pub metadata: PricingMetadata,
}

impl PricingResult {
    /// Line where the patient bears the whole total
    pub fn uncovered(
        item_id: ItemId,
        quantity: u32,
        unit_price: Decimal,
        total_price: Decimal,
        reasons: Vec<String>,
        metadata: PricingMetadata,
    ) -> Self {
        Self {
            item_id,
            outcome: CoverageOutcome::Uncovered,
            is_covered: false,
            quantity,
            unit_price,
            total_price,
            insurance_share: Decimal::ZERO,
            patient_share: total_price,
            coverage_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            deduction_amount: total_price,
            deduction_reasons: reasons,
            warnings: Vec::new(),
            applied_condition_id: None,
            metadata,
        }
    }

    /// Patient share plus insurance share plus discount
    pub fn accounted_total(&self) -> Decimal {
        self.insurance_share + self.patient_share + self.discount_amount
    }
}

/// One line of an invoice to be priced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default)]
    pub body_part_id: Option<BodyPartId>,
    /// Used verbatim instead of the catalog price when set
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

impl InvoiceLineRequest {
    pub fn new(item_id: ItemId, quantity: u32) -> Self {
        Self {
            item_id,
            quantity,
            body_part_id: None,
            unit_price: None,
        }
    }

    pub fn with_body_part(mut self, body_part_id: BodyPartId) -> Self {
        self.body_part_id = Some(body_part_id);
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }
}

/// Totals over the priced lines of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub total_price: Decimal,
    pub insurance_share: Decimal,
    pub patient_share: Decimal,
    pub discount_amount: Decimal,
    pub deduction_amount: Decimal,
    pub line_count: usize,
    /// Items that could not be resolved and were not priced
    pub skipped_item_ids: Vec<ItemId>,
}

impl InvoiceSummary {
    pub(crate) fn add(&mut self, line: &PricingResult) {
        self.total_price += line.total_price;
        self.insurance_share += line.insurance_share;
        self.patient_share += line.patient_share;
        self.discount_amount += line.discount_amount;
        self.deduction_amount += line.deduction_amount;
        self.line_count += 1;
    }
}

/// Priced invoice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoicePricingResult {
    pub lines: Vec<PricingResult>,
    pub summary: InvoiceSummary,
}
