//! Restriction enforcement
//!
//! Restrictions encode hard clinical and business conflicts. Any violation
//! denies coverage for the line outright; the checker never clips quantity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{BodyPartId, PeriodType, RestrictionId};

use crate::catalog::Item;
use crate::condition::{ConditionRestriction, PriceCondition, RestrictionType};
use crate::employee::Employee;
use crate::ports::{CatalogPort, UsagePort};
use crate::usage::UsageCounter;

/// A violated restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionViolation {
    pub restriction_type: RestrictionType,
    pub message: String,
    pub restriction_id: RestrictionId,
}

/// Evaluates a condition's restrictions against historical usage
pub struct ConflictChecker<'a, S: ?Sized> {
    usage: &'a UsageCounter<'a, S>,
    default_period: PeriodType,
}

impl<'a, S> ConflictChecker<'a, S>
where
    S: UsagePort + CatalogPort + ?Sized,
{
    /// `default_period` applies to restrictions stored without a period type
    pub fn new(usage: &'a UsageCounter<'a, S>, default_period: PeriodType) -> Self {
        Self { usage, default_period }
    }

    /// Returns every violated active restriction of the condition
    pub fn check(
        &self,
        condition: &PriceCondition,
        item: &Item,
        employee: &Employee,
        body_part: Option<BodyPartId>,
        as_of: NaiveDate,
    ) -> Vec<RestrictionViolation> {
        condition
            .active_restrictions()
            .filter_map(|restriction| self.check_restriction(restriction, item, employee, body_part, as_of))
            .inspect(|violation| {
                debug!(
                    condition = %condition.id,
                    restriction = %violation.restriction_id,
                    kind = %violation.restriction_type,
                    "Restriction violated"
                );
            })
            .collect()
    }

    fn check_restriction(
        &self,
        restriction: &ConditionRestriction,
        item: &Item,
        employee: &Employee,
        body_part: Option<BodyPartId>,
        as_of: NaiveDate,
    ) -> Option<RestrictionViolation> {
        let period = restriction.period_type.unwrap_or(self.default_period);

        let message = match restriction.restriction_type {
            RestrictionType::ConflictItem => {
                let conflict_item = restriction.conflict_item_id?;
                let used = self.usage.count_usage(employee, conflict_item, period, as_of);
                (used > 0).then(|| {
                    format!(
                        "Conflicts with item {} already used {} time(s) this {} period",
                        conflict_item, used, period
                    )
                })
            }
            RestrictionType::MaxPerBodyPart => {
                let body_part = body_part?;
                let max_count = restriction.max_count?;
                let used = self
                    .usage
                    .count_body_part_usage(employee, item.id, body_part, period, as_of);
                (used >= max_count).then(|| {
                    format!(
                        "Limit of {} per body part reached for {} ({} used this {} period)",
                        max_count, body_part, used, period
                    )
                })
            }
            RestrictionType::RequiredDiagnosis => {
                let required = &restriction.required_illness_ids;
                (!required.is_empty() && !employee.has_any_illness(required)).then(|| {
                    let listed: Vec<String> = required.iter().map(ToString::to_string).collect();
                    format!("Requires an active diagnosis of one of: {}", listed.join(", "))
                })
            }
            RestrictionType::MaxTotalUsage => {
                let max_count = restriction.max_count?;
                let used = self.usage.count_usage(employee, item.id, period, as_of);
                (used >= max_count).then(|| {
                    format!(
                        "Usage limit of {} reached ({} used this {} period)",
                        max_count, used, period
                    )
                })
            }
            RestrictionType::Unknown(_) => None,
        }?;

        Some(RestrictionViolation {
            restriction_type: restriction.restriction_type.clone(),
            message,
            restriction_id: restriction.id,
        })
    }
}
