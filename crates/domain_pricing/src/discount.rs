//! Discount resolution
//!
//! Four ranked sources can grant a discount on a line. Resolution walks the
//! tiers in priority order and stops at the first tier with a match; inside a
//! tier the highest percentage wins.
//!
//! ```text
//! EmployeeSpecial -> CecItem -> SetItem -> None
//! ```

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{
    round_money, CategoryId, CustomEmployeeCodeId, DiscountId, EmployeeId, ItemGroupId, ItemId,
    Rate, ValidityWindow,
};

use crate::catalog::Item;
use crate::employee::Employee;
use crate::ports::DiscountPort;

/// Terms shared by every discount source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTerms {
    pub id: DiscountId,
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub validity: ValidityWindow,
}

fn default_true() -> bool {
    true
}

impl DiscountTerms {
    pub fn new(id: DiscountId, discount_percentage: Decimal) -> Self {
        Self {
            id,
            discount_percentage,
            max_discount_amount: None,
            is_active: true,
            validity: ValidityWindow::unbounded(),
        }
    }

    pub fn is_effective_on(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.validity.contains(as_of)
    }
}

/// A discount granted to one employee on every item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSpecialDiscount {
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub terms: DiscountTerms,
}

/// A discount for holders of a custom employee code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CecItemDiscount {
    pub custom_employee_code_id: CustomEmployeeCodeId,
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(flatten)]
    pub terms: DiscountTerms,
}

/// A volume discount gated by a minimum quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetItemDiscount {
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub group_id: Option<ItemGroupId>,
    #[serde(default)]
    pub min_quantity: u32,
    #[serde(flatten)]
    pub terms: DiscountTerms,
}

/// Which source produced a line's discount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSourceType {
    EmployeeSpecial,
    CecItem,
    SetItem,
    #[default]
    None,
}

impl DiscountSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountSourceType::EmployeeSpecial => "employee_special",
            DiscountSourceType::CecItem => "cec_item",
            DiscountSourceType::SetItem => "set_item",
            DiscountSourceType::None => "none",
        }
    }
}

impl fmt::Display for DiscountSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a discount source is matched against
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub employee: &'a Employee,
    pub item: &'a Item,
    pub quantity: u32,
    pub as_of: NaiveDate,
}

/// A concrete discount source
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountSource {
    EmployeeSpecial(EmployeeSpecialDiscount),
    CecItem(CecItemDiscount),
    SetItem(SetItemDiscount),
}

impl DiscountSource {
    pub fn terms(&self) -> &DiscountTerms {
        match self {
            DiscountSource::EmployeeSpecial(d) => &d.terms,
            DiscountSource::CecItem(d) => &d.terms,
            DiscountSource::SetItem(d) => &d.terms,
        }
    }

    pub fn source_type(&self) -> DiscountSourceType {
        match self {
            DiscountSource::EmployeeSpecial(_) => DiscountSourceType::EmployeeSpecial,
            DiscountSource::CecItem(_) => DiscountSourceType::CecItem,
            DiscountSource::SetItem(_) => DiscountSourceType::SetItem,
        }
    }

    /// Returns true if the source is in force and scoped to this line
    pub fn matches(&self, ctx: &DiscountContext<'_>) -> bool {
        if !self.terms().is_effective_on(ctx.as_of) {
            return false;
        }

        match self {
            DiscountSource::EmployeeSpecial(d) => d.employee_id == ctx.employee.id,
            DiscountSource::CecItem(d) => {
                ctx.employee.custom_employee_code_id == Some(d.custom_employee_code_id)
                    && scope_matches(ctx.item, d.item_id, d.category_id, None)
            }
            DiscountSource::SetItem(d) => {
                d.min_quantity <= ctx.quantity
                    && scope_matches(ctx.item, d.item_id, d.category_id, d.group_id)
            }
        }
    }

    fn info(&self) -> DiscountInfo {
        let terms = self.terms();
        DiscountInfo {
            percentage: terms.discount_percentage,
            max_amount: terms.max_discount_amount,
            source_type: self.source_type(),
            source_id: Some(terms.id),
        }
    }
}

/// Matches by item, category or group; a source with no scope matches all
fn scope_matches(
    item: &Item,
    item_id: Option<ItemId>,
    category_id: Option<CategoryId>,
    group_id: Option<ItemGroupId>,
) -> bool {
    if item_id.is_none() && category_id.is_none() && group_id.is_none() {
        return true;
    }
    item_id == Some(item.id)
        || (category_id.is_some() && category_id == item.category_id)
        || (group_id.is_some() && group_id == item.group_id)
}

/// The discount resolved for a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountInfo {
    pub percentage: Decimal,
    pub max_amount: Option<Decimal>,
    pub source_type: DiscountSourceType,
    pub source_id: Option<DiscountId>,
}

impl DiscountInfo {
    pub fn none() -> Self {
        Self {
            percentage: Decimal::ZERO,
            max_amount: None,
            source_type: DiscountSourceType::None,
            source_id: None,
        }
    }

    pub fn rate(&self) -> Rate {
        Rate::from_percentage(self.percentage)
    }
}

impl Default for DiscountInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Resolves and applies the best discount for a line
pub struct DiscountCalculator<'a, S: ?Sized> {
    store: &'a S,
    decimal_places: u32,
}

impl<'a, S> DiscountCalculator<'a, S>
where
    S: DiscountPort + ?Sized,
{
    pub fn new(store: &'a S, decimal_places: u32) -> Self {
        Self { store, decimal_places }
    }

    /// Finds the discount for a line, walking tiers in priority order
    pub fn calculate(&self, employee: &Employee, item: &Item, quantity: u32, as_of: NaiveDate) -> DiscountInfo {
        let ctx = DiscountContext {
            employee,
            item,
            quantity,
            as_of,
        };

        for tier in self.tiers(&ctx) {
            if let Some(best) = best_match(&tier, &ctx) {
                let info = best.info();
                debug!(
                    item = %item.id,
                    source = %info.source_type,
                    percentage = %info.percentage,
                    "Discount resolved"
                );
                return info;
            }
        }

        DiscountInfo::none()
    }

    /// Applies a resolved discount to an amount
    ///
    /// The result is clipped to the source's maximum and rounded.
    pub fn apply_discount(&self, amount: Decimal, discount: &DiscountInfo) -> Decimal {
        if discount.percentage <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let mut value = discount.rate().apply(amount);
        if let Some(max) = discount.max_amount {
            value = value.min(max);
        }
        round_money(value, self.decimal_places)
    }

    fn tiers(&self, ctx: &DiscountContext<'_>) -> [Vec<DiscountSource>; 3] {
        let employee_special = self
            .store
            .employee_special_discounts(ctx.employee.id, ctx.as_of)
            .into_iter()
            .map(DiscountSource::EmployeeSpecial)
            .collect();

        let cec_item = match ctx.employee.custom_employee_code_id {
            Some(code) => self
                .store
                .cec_item_discounts(code, ctx.as_of)
                .into_iter()
                .map(DiscountSource::CecItem)
                .collect(),
            None => Vec::new(),
        };

        let set_item = self
            .store
            .set_item_discounts(ctx.as_of)
            .into_iter()
            .map(DiscountSource::SetItem)
            .collect();

        [employee_special, cec_item, set_item]
    }
}

/// Highest percentage among matching sources; lower id on ties
fn best_match<'s>(tier: &'s [DiscountSource], ctx: &DiscountContext<'_>) -> Option<&'s DiscountSource> {
    tier.iter()
        .filter(|source| source.matches(ctx))
        .max_by(|a, b| {
            a.terms()
                .discount_percentage
                .cmp(&b.terms().discount_percentage)
                .then_with(|| b.terms().id.cmp(&a.terms().id))
        })
}
