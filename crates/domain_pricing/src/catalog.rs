//! Billable items and their price list
//!
//! An `Item` is anything that can appear on an invoice line (a drug, a
//! consultation, a device). Its price comes from the `PriceRecord` that is
//! active and valid at the calculation date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CategoryId, ItemGroupId, ItemId, PriceRecordId, Rate, SubCategoryId, ValidityWindow};

/// A billable medical item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Catalog code
    #[serde(default)]
    pub code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Item type code (e.g., "drug", "service", "device")
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sub_category_id: Option<SubCategoryId>,
    #[serde(default)]
    pub group_id: Option<ItemGroupId>,
    /// Whether the insurer may cover this item at all
    #[serde(default = "default_true")]
    pub is_coverage_eligible: bool,
    /// Over-the-counter item
    #[serde(default)]
    pub is_otc: bool,
}

fn default_true() -> bool {
    true
}

impl Item {
    /// Creates a coverage-eligible item with no classification
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            code: String::new(),
            name: String::new(),
            item_type: String::new(),
            category_id: None,
            sub_category_id: None,
            group_id: None,
            is_coverage_eligible: true,
            is_otc: false,
        }
    }
}

/// A price list entry for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: PriceRecordId,
    pub item_id: ItemId,
    pub price: Decimal,
    /// Insurer share used when no coverage condition applies
    #[serde(default)]
    pub default_insurance_percentage: Decimal,
    /// Patient share used when no coverage condition applies
    #[serde(default = "default_patient_percentage")]
    pub default_patient_percentage: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub validity: ValidityWindow,
}

fn default_patient_percentage() -> Decimal {
    dec!(100)
}

impl PriceRecord {
    /// Returns true if the record is active and valid on `as_of`
    pub fn is_effective_on(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.validity.contains(as_of)
    }

    pub fn default_insurance_rate(&self) -> Rate {
        Rate::from_percentage(self.default_insurance_percentage)
    }

    pub fn default_patient_rate(&self) -> Rate {
        Rate::from_percentage(self.default_patient_percentage)
    }
}

/// Picks the price record in force on `as_of`
///
/// Among active, valid records the one with the latest `effective_from`
/// wins (an unset start sorts first); ties go to the higher record id.
pub fn resolve_price<'a, I>(records: I, as_of: NaiveDate) -> Option<&'a PriceRecord>
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    records
        .into_iter()
        .filter(|record| record.is_effective_on(as_of))
        .max_by_key(|record| (record.validity.effective_from, record.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, price: Decimal, from: Option<NaiveDate>) -> PriceRecord {
        PriceRecord {
            id: PriceRecordId::new(id),
            item_id: ItemId::new(1),
            price,
            default_insurance_percentage: Decimal::ZERO,
            default_patient_percentage: dec!(100),
            is_active: true,
            validity: ValidityWindow {
                effective_from: from,
                effective_to: None,
            },
        }
    }

    #[test]
    fn test_latest_effective_from_wins() {
        let records = vec![
            record(1, dec!(80), Some(date(2023, 1, 1))),
            record(2, dec!(100), Some(date(2024, 1, 1))),
            record(3, dec!(120), Some(date(2025, 1, 1))),
        ];

        let price = resolve_price(&records, date(2024, 6, 1)).unwrap();
        assert_eq!(price.price, dec!(100));
    }

    #[test]
    fn test_inactive_records_are_ignored() {
        let mut inactive = record(1, dec!(50), Some(date(2024, 1, 1)));
        inactive.is_active = false;
        let records = vec![inactive, record(2, dec!(70), None)];

        let price = resolve_price(&records, date(2024, 6, 1)).unwrap();
        assert_eq!(price.id, PriceRecordId::new(2));
    }

    #[test]
    fn test_no_price_in_force() {
        let records = vec![record(1, dec!(50), Some(date(2025, 1, 1)))];
        assert!(resolve_price(&records, date(2024, 6, 1)).is_none());
    }

    #[test]
    fn test_item_defaults_on_deserialize() {
        let item: Item = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert!(item.is_coverage_eligible);
        assert!(!item.is_otc);
        assert_eq!(item.category_id, None);
    }
}
