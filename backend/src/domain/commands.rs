//! Domain-level command types consumed by `SplitBreakdownService`.
//! Form glue maps its own state into these.

use shared::ParticipantContribution;

/// Input for starting a new bill draft.
#[derive(Debug, Clone)]
pub struct CreateDraftCommand {
    pub title: String,
    pub total_amount_due: String,
    pub creditor_id: String,
    /// Selected participants in selection order; registered and unregistered may be mixed
    pub participants: Vec<ParticipantContribution>,
}

/// A keystroke-level edit to one participant's amount field.
#[derive(Debug, Clone)]
pub struct EditContributionCommand {
    pub identifier: String,
    /// Raw field text, stored as typed
    pub contribution: String,
}
