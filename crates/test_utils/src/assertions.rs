//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for pricing results that give
//! more meaningful error messages than standard assertions.

use domain_pricing::{CoverageOutcome, InvoicePricingResult, PricingResult};
use rust_decimal::Decimal;

/// Asserts that two amounts are equal, naming the field on failure
pub fn assert_amount_eq(actual: Decimal, expected: Decimal, what: &str) {
    assert_eq!(
        actual, expected,
        "{} mismatch: actual={}, expected={}",
        what, actual, expected
    );
}

/// Asserts that a line was covered by a condition
pub fn assert_covered(result: &PricingResult) {
    assert_eq!(
        result.outcome,
        CoverageOutcome::Covered,
        "Expected covered line, got {} with reasons {:?}",
        result.outcome,
        result.deduction_reasons
    );
    assert!(result.is_covered, "Covered line must have is_covered set");
    assert!(result.applied_condition_id.is_some(), "Covered line must record its condition");
}

/// Asserts that a line was denied coverage
///
/// # Panics
///
/// Panics unless the outcome is Uncovered, the insurer pays nothing and the
/// patient pays the total
pub fn assert_uncovered(result: &PricingResult) {
    assert_eq!(
        result.outcome,
        CoverageOutcome::Uncovered,
        "Expected uncovered line, got {}",
        result.outcome
    );
    assert!(!result.is_covered);
    assert_eq!(result.insurance_share, Decimal::ZERO, "Uncovered line must have zero insurance share");
    assert_eq!(
        result.patient_share, result.total_price,
        "Uncovered line must charge the patient the total"
    );
    assert!(!result.deduction_reasons.is_empty(), "Uncovered line must explain itself");
}

/// Asserts that some deduction reason contains the fragment
pub fn assert_reason_contains(result: &PricingResult, fragment: &str) {
    assert!(
        result.deduction_reasons.iter().any(|reason| reason.contains(fragment)),
        "No deduction reason contains '{}': {:?}",
        fragment,
        result.deduction_reasons
    );
}

/// Asserts that insurance, patient and discount add back up to the total
pub fn assert_shares_balance(result: &PricingResult) {
    assert_eq!(
        result.accounted_total(),
        result.total_price,
        "Shares don't balance: insurance={} patient={} discount={} total={}",
        result.insurance_share,
        result.patient_share,
        result.discount_amount,
        result.total_price
    );
}

/// Asserts that the invoice summary equals the sum of its lines
pub fn assert_summary_matches_lines(invoice: &InvoicePricingResult) {
    let sum = |f: fn(&PricingResult) -> Decimal| invoice.lines.iter().map(f).sum::<Decimal>();

    assert_eq!(invoice.summary.line_count, invoice.lines.len());
    assert_eq!(invoice.summary.total_price, sum(|l| l.total_price));
    assert_eq!(invoice.summary.insurance_share, sum(|l| l.insurance_share));
    assert_eq!(invoice.summary.patient_share, sum(|l| l.patient_share));
    assert_eq!(invoice.summary.discount_amount, sum(|l| l.discount_amount));
    assert_eq!(invoice.summary.deduction_amount, sum(|l| l.deduction_amount));
}
