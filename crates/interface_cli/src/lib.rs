//! Command line interface for the pricing engine
//!
//! Wires configuration, the snapshot-backed store and `PricingService`
//! together. The binary in `src/bin/pricing_engine.rs` is a thin shell
//! over [`price_invoice`].

pub mod config;
pub mod dto;
pub mod error;

use chrono::NaiveDate;
use tracing::info;
use validator::Validate;

use domain_pricing::{PricingConfig, PricingService, PricingStore};

pub use config::CliConfig;
pub use dto::{InvoiceRequest, InvoiceResponse, LineRequest};
pub use error::CliError;

/// Validates and prices an invoice request
///
/// # Errors
///
/// Returns error if the request is invalid, the configuration is rejected
/// or the employee or an item cannot be resolved.
pub fn price_invoice<S>(
    store: &S,
    pricing: PricingConfig,
    request: &InvoiceRequest,
    as_of: NaiveDate,
) -> Result<InvoiceResponse, CliError>
where
    S: PricingStore + ?Sized,
{
    request.validate()?;
    let service = PricingService::with_config(store, pricing)?;
    let result = service.calculate_invoice_for(request.employee(), &request.line_requests(), as_of)?;

    info!(
        employee = %request.employee(),
        %as_of,
        lines = result.summary.line_count,
        skipped = result.summary.skipped_item_ids.len(),
        total = %result.summary.total_price,
        "Invoice priced"
    );
    Ok(InvoiceResponse::new(request.employee(), as_of, result))
}
