//! Bill split allocation engine.
//!
//! Pure functions over a participant snapshot. Nothing here mutates the
//! caller's records: each recompute returns a fresh list.
//!
//! ## Re-balancing
//!
//! 1. Partition payers (creditor excluded) into dirty (user-typed) and clean.
//! 2. `clean_target = total_amount_due - sum(dirty)`.
//! 3. Spread `clean_target` evenly over the clean fields, earliest entries
//!    taking the indivisible remainder.
//! 4. Dirty fields are never touched.
//!
//! A rewind clears every dirty flag first, so the whole total is spread
//! across all payers.

use shared::{AllocationSummary, AllocationValue, ParticipantContribution};
use tracing::debug;

use crate::domain::models::{Amount, CurrencyFormat};

/// Read a record's contribution as minor units. Missing or unreadable text is `Invalid`.
pub fn parse_contribution(
    record: &ParticipantContribution,
    currency: &CurrencyFormat,
) -> AllocationValue {
    record
        .contribution
        .as_deref()
        .and_then(|text| Amount::parse(text, currency))
        .map(|amount| AllocationValue::Valid(amount.minor_units()))
        .unwrap_or(AllocationValue::Invalid)
}

/// Sum every contribution except the creditor's.
///
/// Unreadable entries stay in the list as `Invalid` and make the total
/// `Invalid`, so callers can tell "invalid entry" apart from "doesn't add up".
pub fn sum_total_participant_allocations(
    records: &[ParticipantContribution],
    creditor_id: &str,
    currency: &CurrencyFormat,
) -> AllocationSummary {
    let all_allocations_excluding_creditor: Vec<AllocationValue> = records
        .iter()
        .filter(|record| record.identifier != creditor_id)
        .map(|record| parse_contribution(record, currency))
        .collect();

    let total = all_allocations_excluding_creditor
        .iter()
        .fold(AllocationValue::default(), |acc, value| acc.checked_add(*value));

    AllocationSummary {
        total,
        all_allocations_excluding_creditor,
    }
}

/// Split `remaining_total` over `field_count` fields in whole minor units.
///
/// The result always sums to `remaining_total` exactly; the first
/// `remaining_total % field_count` entries get one extra unit. A negative
/// remainder yields zeros and zero fields yield an empty list.
pub fn calculate_even_amounts(remaining_total: Amount, field_count: usize) -> Vec<Amount> {
    if field_count == 0 {
        return Vec::new();
    }
    if remaining_total.minor_units() <= 0 {
        return vec![Amount::ZERO; field_count];
    }

    let count = field_count as i64;
    let base = remaining_total.minor_units() / count;
    let remainder = remaining_total.minor_units() % count;

    (0..count)
        .map(|i| Amount::from_minor_units(if i < remainder { base + 1 } else { base }))
        .collect()
}

/// Recompute every clean payer's contribution so the bill adds up.
///
/// The creditor's contribution is cleared. If a dirty entry cannot be read
/// the clean fields are left as they were, since the amount left over is unknown.
pub fn rebalance(
    records: &[ParticipantContribution],
    creditor_id: &str,
    total_amount_due: Amount,
    currency: &CurrencyFormat,
) -> Vec<ParticipantContribution> {
    let mut next: Vec<ParticipantContribution> = records.to_vec();

    for record in next.iter_mut().filter(|r| r.identifier == creditor_id) {
        record.contribution = None;
        record.is_dirty = false;
    }

    let dirty: Vec<ParticipantContribution> = next
        .iter()
        .filter(|r| r.identifier != creditor_id && r.is_dirty)
        .cloned()
        .collect();
    let dirty_total = sum_total_participant_allocations(&dirty, creditor_id, currency).total;

    let dirty_total = match dirty_total {
        AllocationValue::Valid(units) => Amount::from_minor_units(units),
        AllocationValue::Invalid => {
            debug!(
                "Skipping rebalance: {} dirty entries include an unreadable amount",
                dirty.len()
            );
            return next;
        }
    };

    let clean_target = total_amount_due
        .checked_sub(dirty_total)
        .unwrap_or(Amount::ZERO);

    let clean_positions: Vec<usize> = next
        .iter()
        .enumerate()
        .filter(|(_, r)| r.identifier != creditor_id && !r.is_dirty)
        .map(|(i, _)| i)
        .collect();

    let even_amounts = calculate_even_amounts(clean_target, clean_positions.len());

    debug!(
        "Rebalanced: target={} dirty_total={} clean_target={} clean_fields={}",
        total_amount_due,
        dirty_total,
        clean_target,
        clean_positions.len()
    );

    for (position, amount) in clean_positions.into_iter().zip(even_amounts) {
        next[position].contribution = Some(amount.to_input_string(currency));
    }

    next
}

/// Rewind: forget every manual edit and split the whole total evenly
pub fn reset_even_split(
    records: &[ParticipantContribution],
    creditor_id: &str,
    total_amount_due: Amount,
    currency: &CurrencyFormat,
) -> Vec<ParticipantContribution> {
    let cleared: Vec<ParticipantContribution> = records
        .iter()
        .cloned()
        .map(|mut record| {
            record.is_dirty = false;
            record
        })
        .collect();

    rebalance(&cleared, creditor_id, total_amount_due, currency)
}
