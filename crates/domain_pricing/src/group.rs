//! Condition groups
//!
//! A group caps consumption across a named set of items. Group caps are
//! advisory: violations surface as warnings on the pricing result and never
//! reduce coverage.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CategoryId, ConditionGroupId, ItemId, PeriodType};

use crate::catalog::Item;
use crate::employee::Employee;
use crate::ports::{CatalogPort, GroupPort, UsagePort};
use crate::usage::UsageCounter;

/// A member of a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMember {
    /// A single item
    Item(ItemId),
    /// Every item in the category
    Category(CategoryId),
}

/// A named set of items sharing soft caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub id: ConditionGroupId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
    /// Quantity cap across all members
    #[serde(default)]
    pub max_per_period: Option<u32>,
    /// Insurance money cap across all members
    #[serde(default)]
    pub max_total_amount: Option<Decimal>,
    #[serde(default)]
    pub period_type: Option<PeriodType>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl ConditionGroup {
    /// Concrete member item ids, with categories expanded through the catalog
    pub fn member_item_ids<C>(&self, catalog: &C) -> BTreeSet<ItemId>
    where
        C: CatalogPort + ?Sized,
    {
        let mut ids = BTreeSet::new();
        for member in &self.members {
            match *member {
                GroupMember::Item(item) => {
                    ids.insert(item);
                }
                GroupMember::Category(category) => {
                    ids.extend(catalog.item_ids_in_category(category));
                }
            }
        }
        ids
    }
}

/// A group cap that has been reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupViolation {
    pub group_id: ConditionGroupId,
    pub group_name: String,
    pub message: String,
}

/// Evaluates soft caps of every active group containing an item
pub struct GroupChecker<'a, S: ?Sized> {
    store: &'a S,
    usage: &'a UsageCounter<'a, S>,
    default_period: PeriodType,
}

impl<'a, S> GroupChecker<'a, S>
where
    S: GroupPort + UsagePort + CatalogPort + ?Sized,
{
    pub fn new(store: &'a S, usage: &'a UsageCounter<'a, S>, default_period: PeriodType) -> Self {
        Self {
            store,
            usage,
            default_period,
        }
    }

    pub fn check(&self, item: &Item, employee: &Employee, as_of: NaiveDate) -> Vec<GroupViolation> {
        let mut groups: Vec<ConditionGroup> = self
            .store
            .active_groups()
            .into_iter()
            .filter(|group| group.is_active)
            .collect();
        groups.sort_by_key(|group| group.id);

        let mut violations = Vec::new();
        for group in groups {
            let members = group.member_item_ids(self.store);
            if !members.contains(&item.id) {
                continue;
            }
            let period = group.period_type.unwrap_or(self.default_period);

            if let Some(max_quantity) = group.max_per_period {
                let used = self.usage.count_items_usage(employee, &members, period, as_of);
                if used >= max_quantity {
                    violations.push(GroupViolation {
                        group_id: group.id,
                        group_name: group.name.clone(),
                        message: format!(
                            "Group '{}' quantity limit of {} reached ({} used this {} period)",
                            group.name, max_quantity, used, period
                        ),
                    });
                }
            }

            if let Some(max_amount) = group.max_total_amount {
                let spent = self.usage.count_group_usage_amount(employee, &members, period, as_of);
                if spent >= max_amount {
                    violations.push(GroupViolation {
                        group_id: group.id,
                        group_name: group.name.clone(),
                        message: format!(
                            "Group '{}' amount limit of {} reached ({} covered this {} period)",
                            group.name, max_amount, spent, period
                        ),
                    });
                }
            }
        }

        if !violations.is_empty() {
            debug!(item = %item.id, count = violations.len(), "Group caps reached");
        }
        violations
    }
}
