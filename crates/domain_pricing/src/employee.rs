//! Insured persons
//!
//! The `Employee` carries everything the engine needs to decide eligibility:
//! demographics for condition matching, organisational attributes for
//! condition filters, active diagnoses for filters and restrictions, and the
//! active insurance record used for waiting-period checks.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    full_years_between, CustomEmployeeCodeId, EmployeeId, IllnessId, InsuranceId, LocationId,
    ProvinceId, SpecialEmployeeTypeId,
};

/// Relation code assumed when an employee record carries none
pub const PRINCIPAL_RELATION: &str = "self";

/// Gender of the insured person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// The insurance record currently in force for an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRecord {
    pub id: InsuranceId,
    /// Start of cover; waiting periods count from this date
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// An insured person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Employment status code
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub province_id: Option<ProvinceId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub custom_employee_code_id: Option<CustomEmployeeCodeId>,
    #[serde(default)]
    pub special_employee_type_id: Option<SpecialEmployeeTypeId>,
    /// Relation to the principal insured ("self", "spouse", "child", ...)
    #[serde(default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub is_head_of_family: bool,
    #[serde(default)]
    pub employment_date: Option<NaiveDate>,
    /// Currently diagnosed illnesses
    #[serde(default)]
    pub active_illness_ids: BTreeSet<IllnessId>,
    #[serde(default)]
    pub active_insurance: Option<InsuranceRecord>,
}

impl Employee {
    /// Creates an employee with no optional attributes set
    pub fn new(id: EmployeeId) -> Self {
        Self {
            id,
            birth_date: None,
            gender: None,
            status: None,
            province_id: None,
            location_id: None,
            custom_employee_code_id: None,
            special_employee_type_id: None,
            relation_type: None,
            is_head_of_family: false,
            employment_date: None,
            active_illness_ids: BTreeSet::new(),
            active_insurance: None,
        }
    }

    /// Age in whole years on `as_of`, if the birth date is known
    pub fn age_on(&self, as_of: NaiveDate) -> Option<u32> {
        self.birth_date.map(|born| full_years_between(born, as_of))
    }

    /// Employment tenure in whole years on `as_of`
    pub fn tenure_years_on(&self, as_of: NaiveDate) -> u32 {
        self.employment_date
            .map(|hired| full_years_between(hired, as_of))
            .unwrap_or(0)
    }

    /// Relation code, defaulting to the principal insured
    pub fn relation_code(&self) -> &str {
        self.relation_type.as_deref().unwrap_or(PRINCIPAL_RELATION)
    }

    /// Returns true if any of the given illnesses is currently diagnosed
    pub fn has_any_illness(&self, illnesses: &[IllnessId]) -> bool {
        illnesses.iter().any(|id| self.active_illness_ids.contains(id))
    }

    /// Days since the active insurance started, if there is one
    pub fn days_insured_on(&self, as_of: NaiveDate) -> Option<i64> {
        self.active_insurance
            .as_ref()
            .map(|insurance| (as_of - insurance.start_date).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_requires_birth_date() {
        let mut employee = Employee::new(EmployeeId::new(1));
        assert_eq!(employee.age_on(date(2024, 1, 1)), None);

        employee.birth_date = Some(date(1984, 3, 2));
        assert_eq!(employee.age_on(date(2024, 3, 1)), Some(39));
        assert_eq!(employee.age_on(date(2024, 3, 2)), Some(40));
    }

    #[test]
    fn test_relation_defaults_to_self() {
        let mut employee = Employee::new(EmployeeId::new(1));
        assert_eq!(employee.relation_code(), "self");

        employee.relation_type = Some("spouse".to_string());
        assert_eq!(employee.relation_code(), "spouse");
    }

    #[test]
    fn test_days_insured() {
        let mut employee = Employee::new(EmployeeId::new(1));
        assert_eq!(employee.days_insured_on(date(2024, 5, 1)), None);

        employee.active_insurance = Some(InsuranceRecord {
            id: InsuranceId::new(3),
            start_date: date(2024, 4, 1),
            end_date: None,
        });
        assert_eq!(employee.days_insured_on(date(2024, 5, 1)), Some(30));
    }

    #[test]
    fn test_illness_intersection() {
        let mut employee = Employee::new(EmployeeId::new(1));
        employee.active_illness_ids.insert(IllnessId::new(10));

        assert!(employee.has_any_illness(&[IllnessId::new(3), IllnessId::new(10)]));
        assert!(!employee.has_any_illness(&[IllnessId::new(3)]));
        assert!(!employee.has_any_illness(&[]));
    }
}
