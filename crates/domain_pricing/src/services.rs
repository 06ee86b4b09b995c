//! Pricing domain services
//!
//! `PricingService` orchestrates the matcher, rule engine, usage caps,
//! restriction and group checks and discount resolution into the price of
//! one invoice line, and sums lines into an invoice.
//!
//! # Line pipeline
//!
//! ```text
//! price -> eligible? -> match -> rule -> waiting period -> period cap
//!       -> prescription cap -> restrictions -> groups -> split -> discount
//! ```
//!
//! Every branch ends in a `PricingResult`: `Uncovered` when coverage is
//! denied, `DefaultCoverage` when no condition applies and `Covered` when one
//! does.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument, warn};

use core_kernel::{extend, non_negative, round_money, BodyPartId, EmployeeId, ItemId, Rate};

use crate::catalog::{resolve_price, Item, PriceRecord};
use crate::condition::PriceCondition;
use crate::config::PricingConfig;
use crate::conflict::ConflictChecker;
use crate::discount::{DiscountCalculator, DiscountInfo};
use crate::employee::Employee;
use crate::error::PricingError;
use crate::group::GroupChecker;
use crate::matcher::ConditionMatcher;
use crate::ports::PricingStore;
use crate::result::{
    CoverageOutcome, InvoiceLineRequest, InvoicePricingResult, PricingMetadata, PricingResult,
};
use crate::rules_engine::{FeatureContext, RuleEngineAdapter};
use crate::usage::UsageCounter;

/// Line facts that stay fixed while a line is priced
struct LineInput<'l> {
    item: &'l Item,
    employee: &'l Employee,
    requested: u32,
    body_part: Option<BodyPartId>,
    unit_price: Decimal,
    price_record: Option<PriceRecord>,
    as_of: NaiveDate,
}

/// Service for pricing invoice lines against coverage conditions
///
/// The service holds no mutable state; every call reads the store as it is
/// at call time, so repeated calls over an unchanged store return identical
/// results.
pub struct PricingService<'a, S: ?Sized> {
    store: &'a S,
    config: PricingConfig,
    rules: RuleEngineAdapter,
}

impl<'a, S> PricingService<'a, S>
where
    S: PricingStore + ?Sized,
{
    /// Creates a service with the default configuration
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: PricingConfig::default(),
            rules: RuleEngineAdapter::new(),
        }
    }

    /// Creates a service with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is out of range
    pub fn with_config(store: &'a S, config: PricingConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            rules: RuleEngineAdapter::new(),
        })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Prices one line for an employee
    ///
    /// # Arguments
    ///
    /// * `item` - The billed item
    /// * `employee` - The insured person consuming it
    /// * `quantity` - Requested quantity
    /// * `body_part` - Body part treated, for per-body-part restrictions
    /// * `unit_price_override` - Used verbatim instead of the catalog price
    /// * `as_of` - Reference date for validity windows and usage periods
    ///
    /// # Returns
    ///
    /// A result describing the outcome; quantity and totals reflect any caps
    #[instrument(
        skip(self, item, employee, unit_price_override),
        fields(item = %item.id, employee = %employee.id)
    )]
    pub fn calculate(
        &self,
        item: &Item,
        employee: &Employee,
        quantity: u32,
        body_part: Option<BodyPartId>,
        unit_price_override: Option<Decimal>,
        as_of: NaiveDate,
    ) -> PricingResult {
        let records = self.store.price_records(item.id, as_of);
        let price_record = resolve_price(&records, as_of).cloned();
        let unit_price = unit_price_override
            .or_else(|| price_record.as_ref().map(|record| record.price))
            .unwrap_or(Decimal::ZERO);

        let line = LineInput {
            item,
            employee,
            requested: quantity,
            body_part,
            unit_price,
            price_record,
            as_of,
        };

        let result = self.price_line(&line);
        debug!(
            outcome = %result.outcome,
            quantity = result.quantity,
            insurance = %result.insurance_share,
            patient = %result.patient_share,
            "Line priced"
        );
        result
    }

    /// Prices every resolvable line of an invoice
    ///
    /// Lines whose item cannot be found are skipped and listed in the
    /// summary. Lines do not count toward each other's usage.
    #[instrument(skip(self, lines, employee), fields(employee = %employee.id, lines = lines.len()))]
    pub fn calculate_invoice(
        &self,
        lines: &[InvoiceLineRequest],
        employee: &Employee,
        as_of: NaiveDate,
    ) -> InvoicePricingResult {
        let mut invoice = InvoicePricingResult::default();

        for request in lines {
            let Some(item) = self.store.item(request.item_id) else {
                warn!(item = %request.item_id, "Invoice line item not found, skipping");
                invoice.summary.skipped_item_ids.push(request.item_id);
                continue;
            };

            let line = self.calculate(
                &item,
                employee,
                request.quantity,
                request.body_part_id,
                request.unit_price,
                as_of,
            );
            invoice.summary.add(&line);
            invoice.lines.push(line);
        }

        invoice
    }

    /// Resolves item and employee from the store, then prices the line
    ///
    /// # Errors
    ///
    /// Returns error if either the item or the employee is unknown
    pub fn calculate_for_ids(
        &self,
        item_id: ItemId,
        employee_id: EmployeeId,
        quantity: u32,
        body_part: Option<BodyPartId>,
        unit_price_override: Option<Decimal>,
        as_of: NaiveDate,
    ) -> Result<PricingResult, PricingError> {
        let item = self.store.item(item_id).ok_or(PricingError::ItemNotFound(item_id))?;
        let employee = self
            .store
            .employee(employee_id)
            .ok_or(PricingError::EmployeeNotFound(employee_id))?;
        Ok(self.calculate(&item, &employee, quantity, body_part, unit_price_override, as_of))
    }

    /// Resolves the employee from the store, then prices the invoice
    ///
    /// # Errors
    ///
    /// Returns error if the employee is unknown
    pub fn calculate_invoice_for(
        &self,
        employee_id: EmployeeId,
        lines: &[InvoiceLineRequest],
        as_of: NaiveDate,
    ) -> Result<InvoicePricingResult, PricingError> {
        let employee = self
            .store
            .employee(employee_id)
            .ok_or(PricingError::EmployeeNotFound(employee_id))?;
        Ok(self.calculate_invoice(lines, &employee, as_of))
    }

    fn price_line(&self, line: &LineInput<'_>) -> PricingResult {
        let total = extend(line.unit_price, line.requested);

        if !line.item.is_coverage_eligible {
            debug!("Item is not eligible for coverage");
            return self.uncovered(
                line,
                line.requested,
                total,
                vec!["Item is not covered by insurance".to_string()],
                None,
            );
        }

        let candidates = ConditionMatcher::new(self.store).match_conditions(line.item, line.employee, line.as_of);
        if candidates.is_empty() {
            debug!("No condition matched, using default coverage");
            return self.default_coverage(line, total);
        }

        let extra = FeatureContext::new();
        let selected = candidates.into_iter().find(|condition| {
            let admitted = self
                .rules
                .evaluate(condition, line.employee, line.item, line.as_of, &extra);
            if !admitted {
                debug!(condition = %condition.id, "Condition rejected by rule expression");
            }
            admitted
        });
        let Some(selected) = selected else {
            debug!("Every matched condition was rejected by its rule, using default coverage");
            return self.default_coverage(line, total);
        };
        debug!(condition = %selected.id, priority = selected.priority, "Condition selected");

        if let Some(reason) = waiting_period_unmet(&selected, line.employee, line.as_of) {
            return self.uncovered(line, line.requested, total, vec![reason], Some(&selected));
        }

        let usage = UsageCounter::new(self.store, self.config.week_start);
        let mut quantity = line.requested;
        let mut reasons = Vec::new();

        if let Some(cap) = selected.max_per_period {
            let period = selected.cap_period();
            let used = usage.count_usage(line.employee, line.item.id, period, line.as_of);
            if used >= cap {
                let reason = format!(
                    "Period limit of {} reached ({} used this {} period)",
                    cap, used, period
                );
                return self.uncovered(line, quantity, total, vec![reason], Some(&selected));
            }
            let remaining = cap - used;
            if quantity > remaining {
                debug!(cap, used, requested = quantity, "Quantity clipped by period limit");
                reasons.push(format!(
                    "Period limit of {} per {} period: only {} of {} covered",
                    cap, period, remaining, quantity
                ));
                quantity = remaining;
            }
        }

        if let Some(limit) = selected.max_quantity_per_prescription {
            if quantity > limit {
                debug!(limit, requested = quantity, "Quantity clipped by prescription limit");
                reasons.push(format!(
                    "Prescription limit: only {} of {} covered",
                    limit, quantity
                ));
                quantity = limit;
            }
        }
        let total = extend(line.unit_price, quantity);

        let violations = ConflictChecker::new(&usage, self.config.default_restriction_period).check(
            &selected,
            line.item,
            line.employee,
            line.body_part,
            line.as_of,
        );
        if !violations.is_empty() {
            warn!(
                condition = %selected.id,
                violations = violations.len(),
                "Coverage denied by restriction"
            );
            reasons.extend(violations.into_iter().map(|violation| violation.message));
            return self.uncovered(line, quantity, total, reasons, Some(&selected));
        }

        let warnings: Vec<String> = GroupChecker::new(self.store, &usage, self.config.default_restriction_period)
            .check(line.item, line.employee, line.as_of)
            .into_iter()
            .map(|violation| violation.message)
            .collect();

        let mut insurance = selected.coverage_rate().apply(total);
        if let Some(max_per_unit) = selected.max_covered_amount {
            insurance = insurance.min(extend(max_per_unit, quantity));
        }
        let patient = match selected.fixed_patient_share {
            Some(fixed) => extend(fixed, quantity),
            None => total - insurance,
        };

        let discount = self.resolve_discount(line, quantity);
        let (insurance, patient, discount_amount) = self.split_with_discount(total, patient, &discount);

        let metadata = PricingMetadata {
            condition_code: Some(selected.code.clone()),
            condition_name: Some(selected.name.clone()),
            original_quantity: line.requested,
            final_quantity: quantity,
            ..PricingMetadata::default()
        }
        .with_discount(&discount);

        self.rounded(PricingResult {
            item_id: line.item.id,
            outcome: CoverageOutcome::Covered,
            is_covered: true,
            quantity,
            unit_price: line.unit_price,
            total_price: total,
            insurance_share: insurance,
            patient_share: patient,
            coverage_percentage: selected.coverage_percentage,
            discount_amount,
            deduction_amount: extend(line.unit_price, line.requested - quantity),
            deduction_reasons: reasons,
            warnings,
            applied_condition_id: Some(selected.id),
            metadata,
        })
    }

    /// Split taken from the price record's defaults, then discounted
    fn default_coverage(&self, line: &LineInput<'_>, total: Decimal) -> PricingResult {
        let (insurance_rate, patient_rate) = line
            .price_record
            .as_ref()
            .map(|record| (record.default_insurance_rate(), record.default_patient_rate()))
            .unwrap_or((Rate::ZERO, Rate::from_percentage(dec!(100))));

        let patient = patient_rate.apply(total);
        let discount = self.resolve_discount(line, line.requested);
        let (insurance, patient, discount_amount) = self.split_with_discount(total, patient, &discount);

        let metadata = PricingMetadata {
            original_quantity: line.requested,
            final_quantity: line.requested,
            ..PricingMetadata::default()
        }
        .with_discount(&discount);

        self.rounded(PricingResult {
            item_id: line.item.id,
            outcome: CoverageOutcome::DefaultCoverage,
            is_covered: insurance > Decimal::ZERO,
            quantity: line.requested,
            unit_price: line.unit_price,
            total_price: total,
            insurance_share: insurance,
            patient_share: patient,
            coverage_percentage: insurance_rate.as_percentage(),
            discount_amount,
            deduction_amount: Decimal::ZERO,
            deduction_reasons: Vec::new(),
            warnings: Vec::new(),
            applied_condition_id: None,
            metadata,
        })
    }

    fn uncovered(
        &self,
        line: &LineInput<'_>,
        quantity: u32,
        total: Decimal,
        reasons: Vec<String>,
        condition: Option<&PriceCondition>,
    ) -> PricingResult {
        let metadata = PricingMetadata {
            condition_code: condition.map(|c| c.code.clone()),
            condition_name: condition.map(|c| c.name.clone()),
            original_quantity: line.requested,
            final_quantity: quantity,
            ..PricingMetadata::default()
        };

        let mut result = PricingResult::uncovered(line.item.id, quantity, line.unit_price, total, reasons, metadata);
        result.applied_condition_id = condition.map(|c| c.id);
        self.rounded(result)
    }

    fn resolve_discount(&self, line: &LineInput<'_>, quantity: u32) -> DiscountInfo {
        DiscountCalculator::new(self.store, self.config.decimal_places).calculate(
            line.employee,
            line.item,
            quantity,
            line.as_of,
        )
    }

    /// Takes the discount out of the patient share and re-derives the
    /// insurance share from what is left of the total
    ///
    /// A fixed patient share is not capped at the total. When it exceeds the
    /// total the insurer pays nothing and the parts no longer balance.
    fn split_with_discount(
        &self,
        total: Decimal,
        patient: Decimal,
        discount: &DiscountInfo,
    ) -> (Decimal, Decimal, Decimal) {
        let dp = self.config.decimal_places;
        let total = round_money(total, dp);
        let calculator = DiscountCalculator::new(self.store, dp);
        let discount_amount = calculator.apply_discount(total, discount);
        // patient is rounded before insurance is derived, so the parts sum to the rounded total
        let patient = round_money(non_negative(patient - discount_amount), dp);
        let insurance = non_negative(total - patient - discount_amount);
        (insurance, patient, discount_amount)
    }

    fn rounded(&self, mut result: PricingResult) -> PricingResult {
        let dp = self.config.decimal_places;
        result.total_price = round_money(result.total_price, dp);
        result.insurance_share = round_money(result.insurance_share, dp);
        result.patient_share = round_money(result.patient_share, dp);
        result.discount_amount = round_money(result.discount_amount, dp);
        result.deduction_amount = round_money(result.deduction_amount, dp);
        result
    }
}

/// Reason the condition's waiting period blocks coverage, if it does
fn waiting_period_unmet(condition: &PriceCondition, employee: &Employee, as_of: NaiveDate) -> Option<String> {
    if condition.waiting_days == 0 {
        return None;
    }
    let waiting = i64::from(condition.waiting_days);

    match employee.days_insured_on(as_of) {
        Some(insured) if insured >= waiting => None,
        Some(insured) => Some(format!(
            "Waiting period of {} days not met: {} days remaining",
            waiting,
            waiting - insured
        )),
        None => Some(format!(
            "Waiting period of {} days applies but no active insurance is recorded",
            waiting
        )),
    }
}
