//! Condition matching
//!
//! Selects the coverage conditions applicable to an (item, employee, date)
//! triple and ranks them by priority. Matching happens in two passes: the
//! selection predicate (active, valid, scope, demographics), then the
//! employee filters attached to each surviving condition.

use std::cmp::Reverse;

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::Item;
use crate::condition::{ConditionFilter, FilterOperator, FilterType, PriceCondition};
use crate::employee::Employee;
use crate::ports::ConditionPort;

/// Ranks the conditions that apply to an item for an employee
pub struct ConditionMatcher<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ConditionMatcher<'a, S>
where
    S: ConditionPort + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns applicable conditions, highest priority first
    ///
    /// Equal priorities are ordered by ascending condition id.
    pub fn match_conditions(&self, item: &Item, employee: &Employee, as_of: NaiveDate) -> Vec<PriceCondition> {
        let mut matched: Vec<PriceCondition> = self
            .store
            .candidate_conditions(item, as_of)
            .into_iter()
            .filter(|condition| {
                condition.is_effective_on(as_of)
                    && condition.scope_matches(item)
                    && condition.demographics_match(employee, as_of)
            })
            .collect();

        matched.sort_by_key(|condition| (Reverse(condition.priority), condition.id));

        matched.retain(|condition| {
            let passes = filters_pass(condition, employee);
            if !passes {
                debug!(condition = %condition.id, employee = %employee.id, "Condition dropped by filter");
            }
            passes
        });

        matched
    }
}

/// Returns true if every active filter on the condition passes
pub fn filters_pass(condition: &PriceCondition, employee: &Employee) -> bool {
    condition.active_filters().all(|filter| filter_passes(filter, employee))
}

/// Evaluates a single filter against the employee
///
/// Unknown filter types and operators pass. `equals` and `not_equals` with
/// no values never match.
pub fn filter_passes(filter: &ConditionFilter, employee: &Employee) -> bool {
    let attribute = match filter.filter_type {
        FilterType::Province => employee.province_id.map(i64::from),
        FilterType::Location => employee.location_id.map(i64::from),
        FilterType::EmployeeCode => employee.custom_employee_code_id.map(i64::from),
        FilterType::SpecialType => employee.special_employee_type_id.map(i64::from),
        FilterType::Illness => return illness_filter_passes(filter, employee),
        FilterType::Unknown(_) => return true,
    };

    match filter.operator {
        FilterOperator::In => attribute.is_some_and(|value| filter.values.contains(&value)),
        FilterOperator::NotIn => !attribute.is_some_and(|value| filter.values.contains(&value)),
        FilterOperator::Equals => filter.values.first().is_some_and(|&value| attribute == Some(value)),
        FilterOperator::NotEquals => filter.values.first().is_some_and(|&value| attribute != Some(value)),
        FilterOperator::Unknown(_) => true,
    }
}

fn illness_filter_passes(filter: &ConditionFilter, employee: &Employee) -> bool {
    let has = |raw: &i64| {
        employee
            .active_illness_ids
            .iter()
            .any(|illness| illness.value() == *raw)
    };

    match filter.operator {
        FilterOperator::In => filter.values.iter().any(has),
        FilterOperator::NotIn => !filter.values.iter().any(has),
        FilterOperator::Equals => filter.values.first().is_some_and(has),
        FilterOperator::NotEquals => filter.values.first().is_some_and(|value| !has(value)),
        FilterOperator::Unknown(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{EmployeeId, FilterId, IllnessId, ProvinceId};

    fn filter(filter_type: FilterType, operator: FilterOperator, values: Vec<i64>) -> ConditionFilter {
        ConditionFilter {
            id: FilterId::new(1),
            filter_type,
            operator,
            values,
            is_active: true,
        }
    }

    fn employee_in_province(province: Option<i64>) -> Employee {
        let mut employee = Employee::new(EmployeeId::new(1));
        employee.province_id = province.map(ProvinceId::new);
        employee
    }

    #[test]
    fn test_in_and_not_in() {
        let in_filter = filter(FilterType::Province, FilterOperator::In, vec![1, 2]);
        assert!(filter_passes(&in_filter, &employee_in_province(Some(2))));
        assert!(!filter_passes(&in_filter, &employee_in_province(Some(3))));
        assert!(!filter_passes(&in_filter, &employee_in_province(None)));

        let not_in = filter(FilterType::Province, FilterOperator::NotIn, vec![1, 2]);
        assert!(!filter_passes(&not_in, &employee_in_province(Some(2))));
        assert!(filter_passes(&not_in, &employee_in_province(None)));
    }

    #[test]
    fn test_equals_uses_first_value() {
        let equals = filter(FilterType::Province, FilterOperator::Equals, vec![5, 6]);
        assert!(filter_passes(&equals, &employee_in_province(Some(5))));
        assert!(!filter_passes(&equals, &employee_in_province(Some(6))));

        let not_equals = filter(FilterType::Province, FilterOperator::NotEquals, vec![5]);
        assert!(filter_passes(&not_equals, &employee_in_province(Some(6))));
        assert!(filter_passes(&not_equals, &employee_in_province(None)));
    }

    #[test]
    fn test_equals_without_values_never_matches() {
        let equals = filter(FilterType::Province, FilterOperator::Equals, vec![]);
        assert!(!filter_passes(&equals, &employee_in_province(None)));
        assert!(!filter_passes(&equals, &employee_in_province(Some(5))));

        let not_equals = filter(FilterType::Province, FilterOperator::NotEquals, vec![]);
        assert!(!filter_passes(&not_equals, &employee_in_province(None)));
        assert!(!filter_passes(&not_equals, &employee_in_province(Some(5))));

        let illness_not_equals = filter(FilterType::Illness, FilterOperator::NotEquals, vec![]);
        assert!(!filter_passes(&illness_not_equals, &employee_in_province(None)));
    }

    #[test]
    fn test_illness_filters_use_set_intersection() {
        let mut employee = Employee::new(EmployeeId::new(1));
        employee.active_illness_ids.insert(IllnessId::new(7));

        let in_filter = filter(FilterType::Illness, FilterOperator::In, vec![3, 7]);
        assert!(filter_passes(&in_filter, &employee));

        let not_in = filter(FilterType::Illness, FilterOperator::NotIn, vec![3, 7]);
        assert!(!filter_passes(&not_in, &employee));

        let equals = filter(FilterType::Illness, FilterOperator::Equals, vec![3]);
        assert!(!filter_passes(&equals, &employee));
    }

    #[test]
    fn test_unknown_operator_fails_open() {
        let unknown = filter(
            FilterType::Province,
            FilterOperator::Unknown("between".to_string()),
            vec![1],
        );
        assert!(filter_passes(&unknown, &employee_in_province(Some(99))));
    }
}
