//! Tests for request handling - validation and end-to-end pricing of the demo invoice

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::ItemId;
use domain_pricing::{CoverageOutcome, DiscountSourceType, PricingConfig, PricingError};
use infra_store::InMemoryStore;
use interface_cli::{price_invoice, CliError, InvoiceRequest};

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn demo_store() -> InMemoryStore {
    InMemoryStore::from_path(demos_dir().join("snapshot.json")).unwrap()
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn request(value: serde_json::Value) -> InvoiceRequest {
    serde_json::from_value(value).unwrap()
}

// ============= VALIDATION =============
mod validation_tests {
    use super::*;

    #[test]
    fn test_empty_invoice_rejected() {
        let err = price_invoice(
            &demo_store(),
            PricingConfig::default(),
            &request(json!({"employee_id": 501, "lines": []})),
            as_of(),
        )
        .unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = price_invoice(
            &demo_store(),
            PricingConfig::default(),
            &request(json!({"employee_id": 501, "lines": [{"item_id": 1001, "quantity": 0}]})),
            as_of(),
        )
        .unwrap_err();

        let CliError::Validation(errors) = err else {
            panic!("expected a validation error, got {err}");
        };
        assert!(errors.errors().contains_key("lines"));
    }

    #[test]
    fn test_negative_price_override_rejected() {
        let err = price_invoice(
            &demo_store(),
            PricingConfig::default(),
            &request(json!({
                "employee_id": 501,
                "lines": [{"item_id": 1001, "quantity": 1, "unit_price": "-5.00"}]
            })),
            as_of(),
        )
        .unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_unknown_employee_is_a_pricing_error() {
        let err = price_invoice(
            &demo_store(),
            PricingConfig::default(),
            &request(json!({"employee_id": 999, "lines": [{"item_id": 1001, "quantity": 1}]})),
            as_of(),
        )
        .unwrap_err();

        assert!(matches!(err, CliError::Pricing(PricingError::EmployeeNotFound(_))));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PricingConfig {
            decimal_places: 12,
            ..PricingConfig::default()
        };
        let err = price_invoice(
            &demo_store(),
            config,
            &request(json!({"employee_id": 501, "lines": [{"item_id": 1001, "quantity": 1}]})),
            as_of(),
        )
        .unwrap_err();

        assert!(matches!(err, CliError::Pricing(PricingError::Core(_))));
    }

    #[test]
    fn test_missing_request_file_reports_path() {
        let err = InvoiceRequest::from_path(demos_dir().join("missing.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}

// ============= DEMO INVOICE =============
mod demo_invoice_tests {
    use super::*;

    fn priced_demo() -> interface_cli::InvoiceResponse {
        let request = InvoiceRequest::from_path(demos_dir().join("invoice_request.json")).unwrap();
        assert_eq!(request.as_of, Some(as_of()));
        price_invoice(&demo_store(), PricingConfig::default(), &request, as_of()).unwrap()
    }

    #[test]
    fn test_prescription_drug_with_volume_discount() {
        let response = priced_demo();
        let line = &response.lines[0];

        assert_eq!(line.item_id, ItemId::new(1001));
        assert_eq!(line.outcome, CoverageOutcome::Covered);
        assert_eq!(line.total_price, dec!(300.00));
        assert_eq!(line.insurance_share, dec!(210.00));
        assert_eq!(line.discount_amount, dec!(30.00));
        assert_eq!(line.patient_share, dec!(60.00));
        assert_eq!(line.metadata.discount_source_type, DiscountSourceType::SetItem);
    }

    #[test]
    fn test_otc_drug_rejected_by_rule_falls_back_to_price_defaults() {
        let response = priced_demo();
        let line = &response.lines[1];

        assert_eq!(line.outcome, CoverageOutcome::DefaultCoverage);
        assert!(line.is_covered);
        assert_eq!(line.coverage_percentage, dec!(40));
        assert_eq!(line.insurance_share, dec!(10.00));
        assert_eq!(line.patient_share, dec!(15.00));
    }

    #[test]
    fn test_physio_clipped_by_period_limit() {
        let response = priced_demo();
        let line = &response.lines[2];

        assert_eq!(line.outcome, CoverageOutcome::Covered);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.metadata.original_quantity, 4);
        assert_eq!(line.insurance_share, dec!(72.00));
        assert_eq!(line.discount_amount, dec!(4.50));
        assert_eq!(line.patient_share, dec!(13.50));
        assert_eq!(line.deduction_amount, dec!(90.00));
        assert!(line.deduction_reasons[0].contains("only 2 of 4 covered"));
        assert!(line.warnings.is_empty());
    }

    #[test]
    fn test_ineligible_and_unknown_items() {
        let response = priced_demo();

        assert_eq!(response.lines.len(), 4);
        assert_eq!(response.lines[3].outcome, CoverageOutcome::Uncovered);
        assert_eq!(response.lines[3].deduction_amount, dec!(30.00));
        assert_eq!(response.summary.skipped_item_ids, vec![ItemId::new(9999)]);
    }

    #[test]
    fn test_summary_totals() {
        let summary = priced_demo().summary;

        assert_eq!(summary.line_count, 4);
        assert_eq!(summary.total_price, dec!(445.00));
        assert_eq!(summary.insurance_share, dec!(292.00));
        assert_eq!(summary.patient_share, dec!(118.50));
        assert_eq!(summary.discount_amount, dec!(34.50));
        assert_eq!(summary.deduction_amount, dec!(120.00));
    }

    #[test]
    fn test_response_serializes_with_snake_case_outcomes() {
        let value = serde_json::to_value(priced_demo()).unwrap();

        assert_eq!(value["employee_id"], json!(501));
        assert_eq!(value["as_of"], json!("2024-06-15"));
        assert_eq!(value["lines"][1]["outcome"], json!("default_coverage"));
    }
}
