//! Tests for the in-memory store adapter

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{CategoryId, CustomEmployeeCodeId, DateRange, EmployeeId, ItemId};
use domain_pricing::{CatalogPort, ConditionPort, DiscountPort, EmployeePort, GroupPort, InvoiceStatus, UsagePort};
use infra_store::{InMemoryStore, PricingSnapshot, StoreError};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn demo_snapshot_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/snapshot.json")
}

fn demo_store() -> InMemoryStore {
    InMemoryStore::from_path(demo_snapshot_path()).unwrap()
}

// ============= LOADING =============
mod loading_tests {
    use super::*;

    #[test]
    fn test_demo_snapshot_loads() {
        let store = demo_store();
        assert_eq!(store.item_count(), 4);
        assert_eq!(store.employee_count(), 1);
    }

    #[test]
    fn test_empty_document_gives_empty_store() {
        let store = InMemoryStore::from_json_str("{}").unwrap();
        assert_eq!(store.item_count(), 0);
        assert!(store.item(ItemId::new(1)).is_none());
        assert!(store.active_groups().is_empty());
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = InMemoryStore::from_json_str(r#"{"items": [{"code": "no id"}]}"#).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(!err.is_integrity_error());
    }

    #[test]
    fn test_integrity_errors_stop_loading() {
        let duplicate = r#"{"employees": [{"id": 1}, {"id": 1}]}"#;
        let err = InMemoryStore::from_json_str(duplicate).unwrap_err();
        assert!(err.is_integrity_error());
        assert!(err.to_string().contains("Employee"));

        let dangling = r#"{"conditions": [{"id": 1, "item_id": 77, "coverage_percentage": "50"}]}"#;
        let err = InMemoryStore::from_json_str(dangling).unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference(_)));
    }

    #[test]
    fn test_snapshot_survives_serialization() {
        let original = PricingSnapshot::from_path(demo_snapshot_path()).unwrap();
        let json = serde_json::to_string(&original).unwrap();
        let reloaded = PricingSnapshot::from_json_str(&json).unwrap();
        assert_eq!(reloaded, original);
    }
}

// ============= CATALOG AND EMPLOYEES =============
mod catalog_tests {
    use super::*;

    #[test]
    fn test_category_index() {
        let store = demo_store();
        assert_eq!(
            store.item_ids_in_category(CategoryId::new(10)),
            vec![ItemId::new(1001), ItemId::new(1002)]
        );
        assert!(store.item_ids_in_category(CategoryId::new(99)).is_empty());
    }

    #[test]
    fn test_price_records_filtered_by_validity() {
        let store = demo_store();
        assert!(store.price_records(ItemId::new(1001), date(2023, 12, 31)).is_empty());

        let records = store.price_records(ItemId::new(1001), date(2024, 6, 15));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, dec!(100.00));
    }

    #[test]
    fn test_employee_lookup() {
        let store = demo_store();
        let employee = store.employee(EmployeeId::new(501)).unwrap();
        assert_eq!(employee.age_on(date(2024, 6, 15)), Some(34));
        assert!(store.employee(EmployeeId::new(502)).is_none());
    }
}

// ============= CONDITIONS, GROUPS AND DISCOUNTS =============
mod reference_tests {
    use super::*;

    #[test]
    fn test_candidate_conditions_are_scoped() {
        let store = demo_store();
        let physio = store.item(ItemId::new(2001)).unwrap();
        let drug = store.item(ItemId::new(1001)).unwrap();

        let physio_conditions = store.candidate_conditions(&physio, date(2024, 6, 15));
        assert_eq!(physio_conditions.len(), 1);
        assert_eq!(physio_conditions[0].code, "PHY-80");

        let drug_conditions = store.candidate_conditions(&drug, date(2024, 6, 15));
        assert_eq!(drug_conditions.len(), 1);
        assert_eq!(drug_conditions[0].code, "DRG-70");
    }

    #[test]
    fn test_only_active_groups_served() {
        let json = r#"{
            "groups": [
                {"id": 1, "name": "Active", "max_per_period": 2},
                {"id": 2, "name": "Retired", "is_active": false}
            ]
        }"#;
        let store = InMemoryStore::from_json_str(json).unwrap();

        let groups = store.active_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Active");
    }

    #[test]
    fn test_discounts_filtered_by_owner_and_validity() {
        let json = r#"{
            "employee_special_discounts": [
                {"id": 1, "employee_id": 501, "discount_percentage": "15"},
                {"id": 2, "employee_id": 502, "discount_percentage": "20"},
                {"id": 3, "employee_id": 501, "discount_percentage": "25", "effective_to": "2023-12-31"}
            ]
        }"#;
        let store = InMemoryStore::from_json_str(json).unwrap();

        let discounts = store.employee_special_discounts(EmployeeId::new(501), date(2024, 6, 15));
        assert_eq!(discounts.len(), 1);
        assert_eq!(discounts[0].terms.discount_percentage, dec!(15));

        let demo = demo_store();
        assert_eq!(demo.cec_item_discounts(CustomEmployeeCodeId::new(3), date(2024, 6, 15)).len(), 1);
        assert!(demo.cec_item_discounts(CustomEmployeeCodeId::new(4), date(2024, 6, 15)).is_empty());
        assert_eq!(demo.set_item_discounts(date(2024, 6, 15)).len(), 1);
    }
}

// ============= USAGE =============
mod usage_tests {
    use super::*;

    #[test]
    fn test_usage_records_by_employee_and_range() {
        let store = demo_store();
        let year = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let april = DateRange::new(date(2024, 4, 1), date(2024, 4, 30)).unwrap();

        let records = store.usage_records(EmployeeId::new(501), year);
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|record| record.status == InvoiceStatus::Draft));

        assert_eq!(store.usage_records(EmployeeId::new(501), april).len(), 1);
        assert!(store.usage_records(EmployeeId::new(502), year).is_empty());
    }
}
