use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a participant has an account or was added from contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Registered user, identified by their account UUID
    Registered,
    /// Unregistered contact, identified by phone number
    Unregistered,
}

/// One person's share of a bill.
///
/// `contribution` is kept as the raw text the user typed (or the engine
/// assigned) and is only parsed for arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantContribution {
    /// Account UUID for registered users, phone number otherwise
    pub identifier: String,
    pub kind: ParticipantKind,
    /// Display name shown next to the amount field
    pub display_name: String,
    pub contribution: Option<String>,
    /// True once the user has typed into this field since the last rewind
    #[serde(default)]
    pub is_dirty: bool,
}

impl ParticipantContribution {
    pub fn registered(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: ParticipantKind::Registered,
            display_name: display_name.into(),
            contribution: None,
            is_dirty: false,
        }
    }

    pub fn unregistered(phone_number: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: phone_number.into(),
            kind: ParticipantKind::Unregistered,
            display_name: display_name.into(),
            contribution: None,
            is_dirty: false,
        }
    }

    /// Set the field text and dirty flag in one step
    pub fn with_contribution(mut self, contribution: impl Into<String>, is_dirty: bool) -> Self {
        self.contribution = Some(contribution.into());
        self.is_dirty = is_dirty;
        self
    }
}

/// An in-progress bill. Owned by the screen that edits it; every
/// allocation operation takes it by value and hands back a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub id: String,
    pub title: String,
    /// Bill total as typed by the user
    pub total_amount_due: String,
    /// Identifier of the participant being paid
    pub creditor_id: String,
    /// Registered participants first, then unregistered, each in selection order
    pub participants: Vec<ParticipantContribution>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl BillDraft {
    pub fn participant(&self, identifier: &str) -> Option<&ParticipantContribution> {
        self.participants.iter().find(|p| p.identifier == identifier)
    }

    /// Participants who owe money (everyone except the creditor)
    pub fn payers(&self) -> impl Iterator<Item = &ParticipantContribution> {
        self.participants
            .iter()
            .filter(move |p| p.identifier != self.creditor_id)
    }
}

/// Amount in minor currency units, or a marker that the entry could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "minor_units", rename_all = "snake_case")]
pub enum AllocationValue {
    Valid(i64),
    Invalid,
}

impl AllocationValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, AllocationValue::Invalid)
    }

    pub fn minor_units(&self) -> Option<i64> {
        match self {
            AllocationValue::Valid(units) => Some(*units),
            AllocationValue::Invalid => None,
        }
    }

    /// Invalid is absorbing, and overflow also collapses to Invalid
    pub fn checked_add(self, other: AllocationValue) -> AllocationValue {
        match (self, other) {
            (AllocationValue::Valid(a), AllocationValue::Valid(b)) => a
                .checked_add(b)
                .map(AllocationValue::Valid)
                .unwrap_or(AllocationValue::Invalid),
            _ => AllocationValue::Invalid,
        }
    }
}

impl Default for AllocationValue {
    fn default() -> Self {
        AllocationValue::Valid(0)
    }
}

/// Result of summing every non-creditor contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total: AllocationValue,
    /// One entry per non-creditor record, in record order
    pub all_allocations_excluding_creditor: Vec<AllocationValue>,
}

/// Where an allocation session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// Sum equals the bill total and every entry is valid and above the floor
    Balanced,
    /// Contributions add up to more than the bill total
    Excess,
    /// Contributions add up to less than the bill total
    Deficit,
    /// An entry could not be read as an amount, or the sum overflowed
    Invalid,
    /// At least one payer is under the minimum contribution
    BelowMinimum,
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AllocationStatus::Balanced => "balanced",
            AllocationStatus::Excess => "excess",
            AllocationStatus::Deficit => "deficit",
            AllocationStatus::Invalid => "invalid",
            AllocationStatus::BelowMinimum => "below_minimum",
        };
        write!(f, "{}", label)
    }
}

/// Everything form glue needs to render the allocation footer and gate submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub status: AllocationStatus,
    pub summary: AllocationSummary,
    /// Bill total in minor units
    pub target_minor_units: i64,
    /// `total - target`; positive means excess. None when the total is invalid.
    pub difference_minor_units: Option<i64>,
    pub invalid_participants: Vec<String>,
    pub below_minimum_participants: Vec<String>,
}

impl AllocationReport {
    pub fn can_submit(&self) -> bool {
        self.status == AllocationStatus::Balanced
    }
}

/// A single payer's share in a submitted bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillShare {
    pub identifier: String,
    pub kind: ParticipantKind,
    /// Normalized decimal string, e.g. "1500.00"
    pub amount: String,
}

/// Payload handed to the API client once a draft balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBillRequest {
    pub draft_id: String,
    pub title: String,
    pub total_amount_due: String,
    pub creditor_id: String,
    pub shares: Vec<BillShare>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_value_checked_add() {
        let a = AllocationValue::Valid(1500);
        let b = AllocationValue::Valid(2500);
        assert_eq!(a.checked_add(b), AllocationValue::Valid(4000));

        assert_eq!(a.checked_add(AllocationValue::Invalid), AllocationValue::Invalid);
        assert_eq!(AllocationValue::Invalid.checked_add(a), AllocationValue::Invalid);

        // Overflow is reported, not wrapped
        let max = AllocationValue::Valid(i64::MAX);
        assert_eq!(max.checked_add(AllocationValue::Valid(1)), AllocationValue::Invalid);
    }

    #[test]
    fn test_allocation_value_serialization() {
        let json = serde_json::to_string(&AllocationValue::Valid(300)).unwrap();
        assert_eq!(json, r#"{"type":"valid","minor_units":300}"#);

        let json = serde_json::to_string(&AllocationValue::Invalid).unwrap();
        assert_eq!(json, r#"{"type":"invalid"}"#);
    }

    #[test]
    fn test_participant_deserializes_without_dirty_flag() {
        let json = r#"{
            "identifier": "+2348012345678",
            "kind": "unregistered",
            "display_name": "Ada",
            "contribution": "500"
        }"#;

        let participant: ParticipantContribution = serde_json::from_str(json).unwrap();
        assert_eq!(participant.kind, ParticipantKind::Unregistered);
        assert_eq!(participant.contribution.as_deref(), Some("500"));
        assert!(!participant.is_dirty);
    }

    #[test]
    fn test_draft_payers_excludes_creditor() {
        let draft = BillDraft {
            id: "draft-1".to_string(),
            title: "Dinner".to_string(),
            total_amount_due: "3000".to_string(),
            creditor_id: "a".to_string(),
            participants: vec![
                ParticipantContribution::registered("a", "Ade"),
                ParticipantContribution::registered("b", "Bola"),
                ParticipantContribution::unregistered("+2348000000000", "Chi"),
            ],
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let payers: Vec<&str> = draft.payers().map(|p| p.identifier.as_str()).collect();
        assert_eq!(payers, vec!["b", "+2348000000000"]);
        assert!(draft.participant("a").is_some());
        assert!(draft.participant("z").is_none());
    }

    #[test]
    fn test_status_display_and_submit_gate() {
        assert_eq!(AllocationStatus::BelowMinimum.to_string(), "below_minimum");

        let report = AllocationReport {
            status: AllocationStatus::Deficit,
            summary: AllocationSummary {
                total: AllocationValue::Valid(100),
                all_allocations_excluding_creditor: vec![AllocationValue::Valid(100)],
            },
            target_minor_units: 200,
            difference_minor_units: Some(-100),
            invalid_participants: vec![],
            below_minimum_participants: vec![],
        };
        assert!(!report.can_submit());
    }
}
