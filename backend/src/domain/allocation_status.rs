//! Allocation status evaluation.
//!
//! Turns a participant snapshot into the footer state the new-bill form
//! shows: `Invalid` beats `BelowMinimum`, which beats `Excess`/`Deficit`.
//! The minimum contribution is only reported, never enforced by raising amounts.

use shared::{AllocationReport, AllocationStatus, AllocationValue, ParticipantContribution};
use std::cmp::Ordering;

use crate::domain::allocation::{parse_contribution, sum_total_participant_allocations};
use crate::domain::models::{Amount, CurrencyFormat};

/// Pick a status from already-computed facts
pub fn classify_allocation(
    total: AllocationValue,
    target: Amount,
    has_invalid_entry: bool,
    has_entry_below_minimum: bool,
) -> AllocationStatus {
    let total = match total {
        AllocationValue::Valid(units) if !has_invalid_entry => units,
        _ => return AllocationStatus::Invalid,
    };

    if has_entry_below_minimum {
        return AllocationStatus::BelowMinimum;
    }

    match total.cmp(&target.minor_units()) {
        Ordering::Equal => AllocationStatus::Balanced,
        Ordering::Greater => AllocationStatus::Excess,
        Ordering::Less => AllocationStatus::Deficit,
    }
}

/// True when a valid allocation is under the floor
pub fn is_below_minimum(value: AllocationValue, minimum: Amount) -> bool {
    matches!(value, AllocationValue::Valid(units) if units < minimum.minor_units())
}

/// Build the full report for a record set
pub fn evaluate_allocations(
    records: &[ParticipantContribution],
    creditor_id: &str,
    total_amount_due: Amount,
    minimum_contribution: Amount,
    currency: &CurrencyFormat,
) -> AllocationReport {
    let summary = sum_total_participant_allocations(records, creditor_id, currency);

    let mut invalid_participants = Vec::new();
    let mut below_minimum_participants = Vec::new();
    for record in records.iter().filter(|r| r.identifier != creditor_id) {
        let value = parse_contribution(record, currency);
        if value.is_invalid() {
            invalid_participants.push(record.identifier.clone());
        } else if is_below_minimum(value, minimum_contribution) {
            below_minimum_participants.push(record.identifier.clone());
        }
    }

    let status = classify_allocation(
        summary.total,
        total_amount_due,
        !invalid_participants.is_empty(),
        !below_minimum_participants.is_empty(),
    );

    let difference_minor_units = summary
        .total
        .minor_units()
        .and_then(|total| total.checked_sub(total_amount_due.minor_units()));

    AllocationReport {
        status,
        summary,
        target_minor_units: total_amount_due.minor_units(),
        difference_minor_units,
        invalid_participants,
        below_minimum_participants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_currency() -> CurrencyFormat {
        CurrencyFormat::new("", 0).unwrap()
    }

    fn payer(id: &str, amount: &str) -> ParticipantContribution {
        ParticipantContribution::registered(id, id).with_contribution(amount, true)
    }

    fn evaluate(
        records: &[ParticipantContribution],
        target: i64,
        minimum: i64,
    ) -> AllocationReport {
        evaluate_allocations(
            records,
            "creditor",
            Amount::from_minor_units(target),
            Amount::from_minor_units(minimum),
            &create_test_currency(),
        )
    }

    #[test]
    fn test_balanced() {
        let records = vec![
            ParticipantContribution::registered("creditor", "Me"),
            payer("a", "1500"),
            payer("b", "1500"),
        ];

        let report = evaluate(&records, 3000, 100);

        assert_eq!(report.status, AllocationStatus::Balanced);
        assert_eq!(report.difference_minor_units, Some(0));
        assert!(report.can_submit());
    }

    #[test]
    fn test_excess_and_deficit() {
        let over = vec![payer("a", "2000"), payer("b", "1500")];
        let report = evaluate(&over, 3000, 100);
        assert_eq!(report.status, AllocationStatus::Excess);
        assert_eq!(report.difference_minor_units, Some(500));

        let under = vec![payer("a", "1000"), payer("b", "1500")];
        let report = evaluate(&under, 3000, 100);
        assert_eq!(report.status, AllocationStatus::Deficit);
        assert_eq!(report.difference_minor_units, Some(-500));
    }

    #[test]
    fn test_invalid_takes_precedence() {
        let records = vec![payer("a", "abc"), payer("b", "50")];

        let report = evaluate(&records, 3000, 100);

        assert_eq!(report.status, AllocationStatus::Invalid);
        assert_eq!(report.invalid_participants, vec!["a".to_string()]);
        assert_eq!(report.below_minimum_participants, vec!["b".to_string()]);
        assert_eq!(report.difference_minor_units, None);
    }

    #[test]
    fn test_missing_contribution_is_invalid() {
        let records = vec![ParticipantContribution::registered("a", "A"), payer("b", "3000")];

        let report = evaluate(&records, 3000, 100);

        assert_eq!(report.status, AllocationStatus::Invalid);
        assert!(report.summary.total.is_invalid());
    }

    #[test]
    fn test_overflowing_sum_is_invalid_without_bad_entries() {
        let half = (i64::MAX / 2 + 1).to_string();
        let records = vec![payer("a", &half), payer("b", &half)];

        let report = evaluate(&records, 3000, 100);

        assert_eq!(report.status, AllocationStatus::Invalid);
        assert!(report.invalid_participants.is_empty());
        assert_eq!(report.difference_minor_units, None);
    }

    #[test]
    fn test_below_minimum_beats_mismatch() {
        let records = vec![payer("a", "2950"), payer("b", "50")];
        assert_eq!(evaluate(&records, 3000, 100).status, AllocationStatus::BelowMinimum);

        let records = vec![payer("a", "4000"), payer("b", "50")];
        assert_eq!(evaluate(&records, 3000, 100).status, AllocationStatus::BelowMinimum);
    }

    #[test]
    fn test_minimum_is_not_corrected() {
        let records = vec![payer("a", "2990"), payer("b", "10")];

        let report = evaluate(&records, 3000, 100);

        assert_eq!(report.summary.total, AllocationValue::Valid(3000));
        assert_eq!(
            report.summary.all_allocations_excluding_creditor[1],
            AllocationValue::Valid(10)
        );
    }

    #[test]
    fn test_creditor_ignored_for_minimum() {
        let records = vec![
            ParticipantContribution::registered("creditor", "Me"),
            payer("a", "3000"),
        ];

        assert_eq!(evaluate(&records, 3000, 100).status, AllocationStatus::Balanced);
    }

    #[test]
    fn test_classify_allocation_directly() {
        let target = Amount::from_minor_units(100);
        assert_eq!(
            classify_allocation(AllocationValue::Invalid, target, false, true),
            AllocationStatus::Invalid
        );
        assert_eq!(
            classify_allocation(AllocationValue::Valid(100), target, true, false),
            AllocationStatus::Invalid
        );
        assert_eq!(
            classify_allocation(AllocationValue::Valid(100), target, false, false),
            AllocationStatus::Balanced
        );
    }
}
