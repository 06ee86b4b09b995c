//! Historical usage accounting
//!
//! `UsageCounter` answers "how much of X has this person already consumed in
//! the current period?" for items, categories, body parts and item sets. It
//! is the only reader of `UsageRecord`s and the basis for period caps,
//! restrictions and group caps.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use core_kernel::{BodyPartId, CategoryId, EmployeeId, InvoiceId, ItemId, PeriodType};

use crate::employee::Employee;
use crate::ports::{CatalogPort, UsagePort};

/// Status of the invoice a usage record belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Draft,
    Submitted,
    Approved,
    Paid,
    Rejected,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Submitted => "submitted",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Rejected => "rejected",
            InvoiceStatus::Other(raw) => raw,
        }
    }

    /// Draft and rejected invoices never count as consumption
    pub fn counts_as_usage(&self) -> bool {
        !matches!(self, InvoiceStatus::Draft | InvoiceStatus::Rejected)
    }
}

impl From<String> for InvoiceStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => InvoiceStatus::Draft,
            "submitted" => InvoiceStatus::Submitted,
            "approved" => InvoiceStatus::Approved,
            "paid" => InvoiceStatus::Paid,
            "rejected" => InvoiceStatus::Rejected,
            _ => InvoiceStatus::Other(value),
        }
    }
}

impl From<InvoiceStatus> for String {
    fn from(value: InvoiceStatus) -> Self {
        value.as_str().to_string()
    }
}

/// A historical invoice line fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub invoice_id: InvoiceId,
    pub employee_id: EmployeeId,
    pub item_id: ItemId,
    #[serde(default)]
    pub body_part_id: Option<BodyPartId>,
    pub quantity: u32,
    #[serde(default)]
    pub insurance_share: Decimal,
    pub invoice_date: NaiveDate,
    pub status: InvoiceStatus,
}

/// Sums historical consumption within calendar periods
pub struct UsageCounter<'a, S: ?Sized> {
    store: &'a S,
    week_start: Weekday,
}

impl<'a, S> UsageCounter<'a, S>
where
    S: UsagePort + CatalogPort + ?Sized,
{
    pub fn new(store: &'a S, week_start: Weekday) -> Self {
        Self { store, week_start }
    }

    /// Quantity of `item` consumed in the period containing `as_of`
    pub fn count_usage(
        &self,
        employee: &Employee,
        item: ItemId,
        period: PeriodType,
        as_of: NaiveDate,
    ) -> u32 {
        self.sum_quantity(employee, period, as_of, |record| record.item_id == item)
    }

    /// Quantity of any item in `category` consumed in the period
    pub fn count_category_usage(
        &self,
        employee: &Employee,
        category: CategoryId,
        period: PeriodType,
        as_of: NaiveDate,
    ) -> u32 {
        let members: BTreeSet<ItemId> =
            self.store.item_ids_in_category(category).into_iter().collect();
        self.count_items_usage(employee, &members, period, as_of)
    }

    /// Quantity of `item` applied to `body_part` in the period
    pub fn count_body_part_usage(
        &self,
        employee: &Employee,
        item: ItemId,
        body_part: BodyPartId,
        period: PeriodType,
        as_of: NaiveDate,
    ) -> u32 {
        self.sum_quantity(employee, period, as_of, |record| {
            record.item_id == item && record.body_part_id == Some(body_part)
        })
    }

    /// Quantity of any item in `items` consumed in the period
    pub fn count_items_usage(
        &self,
        employee: &Employee,
        items: &BTreeSet<ItemId>,
        period: PeriodType,
        as_of: NaiveDate,
    ) -> u32 {
        self.sum_quantity(employee, period, as_of, |record| items.contains(&record.item_id))
    }

    /// Insurance money paid for any item in `items` in the period
    pub fn count_group_usage_amount(
        &self,
        employee: &Employee,
        items: &BTreeSet<ItemId>,
        period: PeriodType,
        as_of: NaiveDate,
    ) -> Decimal {
        self.counted_records(employee, period, as_of)
            .into_iter()
            .filter(|record| items.contains(&record.item_id))
            .map(|record| record.insurance_share)
            .sum()
    }

    fn sum_quantity<F>(&self, employee: &Employee, period: PeriodType, as_of: NaiveDate, predicate: F) -> u32
    where
        F: Fn(&UsageRecord) -> bool,
    {
        self.counted_records(employee, period, as_of)
            .iter()
            .filter(|record| predicate(record))
            .fold(0u32, |acc, record| acc.saturating_add(record.quantity))
    }

    /// Records of the employee inside the period that count as consumption
    fn counted_records(&self, employee: &Employee, period: PeriodType, as_of: NaiveDate) -> Vec<UsageRecord> {
        let range = period.range_containing(as_of, self.week_start);
        let records: Vec<UsageRecord> = self
            .store
            .usage_records(employee.id, range)
            .into_iter()
            .filter(|record| {
                record.employee_id == employee.id
                    && record.status.counts_as_usage()
                    && range.contains(record.invoice_date)
            })
            .collect();
        trace!(employee = %employee.id, %period, %range, records = records.len(), "Loaded usage records");
        records
    }
}
