//! Strongly-typed identifiers for domain entities
//!
//! Reference data (items, categories, provinces, illnesses, ...) is keyed by
//! integer ids in the upstream store. Wrapping them in newtypes prevents an
//! `ItemId` from being passed where a `CategoryId` is expected while keeping
//! the raw value available for rule evaluation, which compares ids as numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from its raw store value
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw store value
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Catalog identifiers
define_id!(ItemId, "ITM");
define_id!(CategoryId, "CAT");
define_id!(SubCategoryId, "SCAT");
define_id!(ItemGroupId, "IGRP");
define_id!(PriceRecordId, "PRC");
define_id!(BodyPartId, "BPT");

// Insured person identifiers
define_id!(EmployeeId, "EMP");
define_id!(ProvinceId, "PRV");
define_id!(LocationId, "LOC");
define_id!(CustomEmployeeCodeId, "CEC");
define_id!(SpecialEmployeeTypeId, "SET");
define_id!(IllnessId, "ILL");
define_id!(InsuranceId, "INS");

// Coverage rule identifiers
define_id!(ConditionId, "COND");
define_id!(FilterId, "FLT");
define_id!(RestrictionId, "RST");
define_id!(ConditionGroupId, "CGRP");
define_id!(DiscountId, "DSC");

// Billing identifiers
define_id!(InvoiceId, "INV");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        let id = ItemId::new(42);
        assert_eq!(id.to_string(), "ITM-42");
    }

    #[test]
    fn test_id_parsing() {
        let original = ConditionId::new(7);
        let parsed: ConditionId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: ConditionId = "7".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_raw_conversion() {
        let id = CategoryId::from(12);
        let back: i64 = id.into();
        assert_eq!(back, 12);
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(DiscountId::new(1) < DiscountId::new(2));
    }
}
