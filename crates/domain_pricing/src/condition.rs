//! Coverage conditions
//!
//! A `PriceCondition` is a priority-ranked, time-bounded rule that states how
//! much of an item's cost the insurer pays. Conditions carry three kinds of
//! attached rules:
//! - **Filters** narrow which employees the condition applies to
//! - **Restrictions** deny coverage outright when violated
//! - An optional **rule expression** evaluated against employee/item features

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{
    CategoryId, ConditionId, FilterId, IllnessId, ItemId, PeriodType, Rate, RestrictionId,
    SubCategoryId, ValidityWindow,
};

use crate::catalog::Item;
use crate::employee::{Employee, Gender};

/// Employee attribute a filter inspects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterType {
    Province,
    Location,
    EmployeeCode,
    SpecialType,
    Illness,
    /// A stored type this engine does not know; always passes
    Unknown(String),
}

impl FilterType {
    pub fn as_str(&self) -> &str {
        match self {
            FilterType::Province => "province",
            FilterType::Location => "location",
            FilterType::EmployeeCode => "employee_code",
            FilterType::SpecialType => "special_type",
            FilterType::Illness => "illness",
            FilterType::Unknown(raw) => raw,
        }
    }
}

impl From<String> for FilterType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "province" => FilterType::Province,
            "location" => FilterType::Location,
            "employee_code" => FilterType::EmployeeCode,
            "special_type" => FilterType::SpecialType,
            "illness" => FilterType::Illness,
            _ => FilterType::Unknown(value),
        }
    }
}

impl From<FilterType> for String {
    fn from(value: FilterType) -> Self {
        value.as_str().to_string()
    }
}

/// Comparison a filter applies between the attribute and its values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    In,
    NotIn,
    Equals,
    NotEquals,
    /// A stored operator this engine does not know; always passes
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Unknown(raw) => raw,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "in" => FilterOperator::In,
            "not_in" => FilterOperator::NotIn,
            "equals" => FilterOperator::Equals,
            "not_equals" => FilterOperator::NotEquals,
            _ => FilterOperator::Unknown(value),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee filter attached to a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionFilter {
    pub id: FilterId,
    pub filter_type: FilterType,
    pub operator: FilterOperator,
    /// Raw ids compared against the employee attribute
    #[serde(default)]
    pub values: Vec<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Kind of hard restriction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RestrictionType {
    /// Prior use of another item in the period denies coverage
    ConflictItem,
    /// Per-body-part usage cap
    MaxPerBodyPart,
    /// Employee must have one of the listed illnesses
    RequiredDiagnosis,
    /// Total usage cap for the item
    MaxTotalUsage,
    /// A stored type this engine does not know; ignored
    Unknown(String),
}

impl RestrictionType {
    pub fn as_str(&self) -> &str {
        match self {
            RestrictionType::ConflictItem => "conflict_item",
            RestrictionType::MaxPerBodyPart => "max_per_body_part",
            RestrictionType::RequiredDiagnosis => "required_diagnosis",
            RestrictionType::MaxTotalUsage => "max_total_usage",
            RestrictionType::Unknown(raw) => raw,
        }
    }
}

impl From<String> for RestrictionType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "conflict_item" => RestrictionType::ConflictItem,
            "max_per_body_part" => RestrictionType::MaxPerBodyPart,
            "required_diagnosis" => RestrictionType::RequiredDiagnosis,
            "max_total_usage" => RestrictionType::MaxTotalUsage,
            _ => RestrictionType::Unknown(value),
        }
    }
}

impl From<RestrictionType> for String {
    fn from(value: RestrictionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RestrictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard restriction attached to a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRestriction {
    pub id: RestrictionId,
    pub restriction_type: RestrictionType,
    #[serde(default)]
    pub conflict_item_id: Option<ItemId>,
    #[serde(default)]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub period_type: Option<PeriodType>,
    #[serde(default)]
    pub required_illness_ids: Vec<IllnessId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A coverage rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCondition {
    pub id: ConditionId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,

    // Matching scope; all unset means the condition applies to every item
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sub_category_id: Option<SubCategoryId>,

    // Demographic scope; unset means any
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub relation_type: Option<String>,

    /// Higher wins
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub validity: ValidityWindow,

    /// Share of the total paid by the insurer
    pub coverage_percentage: Decimal,
    /// Per-unit patient share overriding the percentage split
    #[serde(default)]
    pub fixed_patient_share: Option<Decimal>,
    /// Per-unit ceiling on the insurer share
    #[serde(default)]
    pub max_covered_amount: Option<Decimal>,
    #[serde(default)]
    pub max_per_period: Option<u32>,
    #[serde(default)]
    pub period_type: Option<PeriodType>,
    #[serde(default)]
    pub max_quantity_per_prescription: Option<u32>,
    /// Days after insurance start before the condition applies
    #[serde(default)]
    pub waiting_days: u32,

    #[serde(default)]
    pub filters: Vec<ConditionFilter>,
    #[serde(default)]
    pub restrictions: Vec<ConditionRestriction>,
    /// Stored boolean rule tree, compiled on evaluation
    #[serde(default)]
    pub rule_expression: Option<Value>,
}

impl PriceCondition {
    /// Creates an active, unscoped condition with the given coverage
    pub fn new(id: ConditionId, coverage_percentage: Decimal) -> Self {
        Self {
            id,
            code: String::new(),
            name: String::new(),
            item_id: None,
            category_id: None,
            sub_category_id: None,
            min_age: None,
            max_age: None,
            gender: None,
            relation_type: None,
            priority: 0,
            is_active: true,
            validity: ValidityWindow::unbounded(),
            coverage_percentage,
            fixed_patient_share: None,
            max_covered_amount: None,
            max_per_period: None,
            period_type: None,
            max_quantity_per_prescription: None,
            waiting_days: 0,
            filters: Vec::new(),
            restrictions: Vec::new(),
            rule_expression: None,
        }
    }

    pub fn coverage_rate(&self) -> Rate {
        Rate::from_percentage(self.coverage_percentage)
    }

    /// True when the condition declares no item/category/sub-category scope
    pub fn is_wildcard(&self) -> bool {
        self.item_id.is_none() && self.category_id.is_none() && self.sub_category_id.is_none()
    }

    /// Returns true if the condition is active and valid on `as_of`
    pub fn is_effective_on(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.validity.contains(as_of)
    }

    /// Returns true if the item falls inside the condition's matching scope
    pub fn scope_matches(&self, item: &Item) -> bool {
        if self.is_wildcard() {
            return true;
        }
        let item_match = self.item_id == Some(item.id);
        let category_match = self.category_id.is_some() && self.category_id == item.category_id;
        let sub_category_match =
            self.sub_category_id.is_some() && self.sub_category_id == item.sub_category_id;
        item_match || category_match || sub_category_match
    }

    /// Returns true if the employee falls inside the demographic scope
    ///
    /// An employee without a birth date passes any age bounds.
    pub fn demographics_match(&self, employee: &Employee, as_of: NaiveDate) -> bool {
        if let Some(age) = employee.age_on(as_of) {
            let min = self.min_age.unwrap_or(0);
            let max = self.max_age.unwrap_or(u32::MAX);
            if age < min || age > max {
                return false;
            }
        }

        if let Some(gender) = self.gender {
            if employee.gender != Some(gender) {
                return false;
            }
        }

        match &self.relation_type {
            Some(relation) => relation.eq_ignore_ascii_case(employee.relation_code()),
            None => true,
        }
    }

    pub fn active_filters(&self) -> impl Iterator<Item = &ConditionFilter> {
        self.filters.iter().filter(|f| f.is_active)
    }

    pub fn active_restrictions(&self) -> impl Iterator<Item = &ConditionRestriction> {
        self.restrictions.iter().filter(|r| r.is_active)
    }

    /// Period over which `max_per_period` is measured
    pub fn cap_period(&self) -> PeriodType {
        self.period_type.unwrap_or_default()
    }
}
