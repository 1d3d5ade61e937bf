//! Split breakdown domain logic for the new-bill flow.
//!
//! This service sits between the new-bill form and the allocation engine.
//! It owns the business rules around a `BillDraft` (who may be edited,
//! participant ordering, when a bill may be submitted) while the form only
//! handles presentation. Drafts are passed in and handed back by value; the
//! screen that owns the draft decides where it is kept.
//!
//! ## Business Rules
//!
//! - Registered participants come first, then unregistered, each in selection order
//! - Identifiers are unique within a draft
//! - The creditor is always a participant, never pays, and cannot be edited or removed
//! - Every edit rebalances the untouched (clean) fields
//! - A bill can only be submitted once its allocations are `Balanced`

use anyhow::Result;
use chrono::Utc;
use shared::{
    AllocationReport, AllocationStatus, BillDraft, BillShare, CreateBillRequest,
    ParticipantContribution, ParticipantKind,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SplitConfig;
use crate::domain::allocation::{parse_contribution, rebalance, reset_even_split};
use crate::domain::allocation_status::evaluate_allocations;
use crate::domain::commands::{CreateDraftCommand, EditContributionCommand};
use crate::domain::models::{Amount, CurrencyFormat, DraftError};

/// Service that applies user actions to a bill draft
#[derive(Debug, Clone)]
pub struct SplitBreakdownService {
    config: SplitConfig,
    currency: CurrencyFormat,
    minimum_contribution: Amount,
}

impl SplitBreakdownService {
    pub fn new() -> Self {
        let config = SplitConfig::default();
        let currency = config.currency().unwrap_or_default();
        let minimum_contribution =
            Amount::parse(&config.minimum_contribution, &currency).unwrap_or_default();
        Self {
            currency,
            minimum_contribution,
            config,
        }
    }

    pub fn with_config(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        let minimum_contribution = config.minimum_contribution_amount()?;
        Ok(Self {
            currency: config.currency()?,
            minimum_contribution,
            config,
        })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    /// Start a draft from the selected participants and split the total evenly
    pub fn create_draft(&self, command: CreateDraftCommand) -> Result<BillDraft> {
        info!(
            "Creating bill draft '{}' with {} participants",
            command.title,
            command.participants.len()
        );

        let title = command.title.trim();
        if title.is_empty() {
            return self.reject("create_draft", DraftError::EmptyTitle);
        }
        if title.chars().count() > self.config.max_title_length {
            return self.reject("create_draft", DraftError::TitleTooLong(title.chars().count()));
        }

        let total = self.parse_total(&command.total_amount_due)?;

        let participants: Vec<ParticipantContribution> = command
            .participants
            .into_iter()
            .map(|mut participant| {
                participant.contribution = None;
                participant.is_dirty = false;
                participant
            })
            .collect();
        let participants = order_participants(participants);
        self.check_participants(&participants, &command.creditor_id)?;

        let participants = rebalance(&participants, &command.creditor_id, total, &self.currency);

        let draft = BillDraft {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            total_amount_due: total.to_input_string(&self.currency),
            creditor_id: command.creditor_id,
            participants,
            created_at: Utc::now().to_rfc3339(),
        };

        info!("Created bill draft {}", draft.id);
        Ok(draft)
    }

    /// Record what the user typed into a payer's field and rebalance the rest.
    ///
    /// Text that isn't a valid amount is kept as typed; `evaluate` reports it as `Invalid`.
    pub fn edit_contribution(
        &self,
        mut draft: BillDraft,
        command: EditContributionCommand,
    ) -> Result<BillDraft> {
        debug!("Editing contribution for {} in draft {}", command.identifier, draft.id);

        if command.identifier == draft.creditor_id {
            return self.reject("edit_contribution", DraftError::CreditorNotEditable);
        }
        let total = self.parse_total(&draft.total_amount_due)?;

        let Some(participant) = draft
            .participants
            .iter_mut()
            .find(|p| p.identifier == command.identifier)
        else {
            let error = DraftError::UnknownParticipant(command.identifier);
            return self.reject("edit_contribution", error);
        };
        participant.contribution = Some(command.contribution);
        participant.is_dirty = true;

        self.rebalance_draft(&mut draft, total);
        Ok(draft)
    }

    /// Add someone to the bill. They start clean and take a share of what's left.
    pub fn add_participant(
        &self,
        mut draft: BillDraft,
        mut participant: ParticipantContribution,
    ) -> Result<BillDraft> {
        info!("Adding participant {} to draft {}", participant.identifier, draft.id);

        if draft.participant(&participant.identifier).is_some() {
            let error = DraftError::DuplicateParticipant(participant.identifier);
            return self.reject("add_participant", error);
        }
        let count = draft.participants.len() + 1;
        if count > self.config.max_participants {
            let error = DraftError::TooManyParticipants(count, self.config.max_participants);
            return self.reject("add_participant", error);
        }
        let total = self.parse_total(&draft.total_amount_due)?;

        participant.contribution = None;
        participant.is_dirty = false;
        let position = match participant.kind {
            ParticipantKind::Registered => draft
                .participants
                .iter()
                .position(|p| p.kind == ParticipantKind::Unregistered)
                .unwrap_or(draft.participants.len()),
            ParticipantKind::Unregistered => draft.participants.len(),
        };
        draft.participants.insert(position, participant);

        self.rebalance_draft(&mut draft, total);
        Ok(draft)
    }

    pub fn remove_participant(&self, mut draft: BillDraft, identifier: &str) -> Result<BillDraft> {
        info!("Removing participant {} from draft {}", identifier, draft.id);

        if identifier == draft.creditor_id {
            return self.reject("remove_participant", DraftError::CannotRemoveCreditor);
        }
        if draft.participant(identifier).is_none() {
            let error = DraftError::UnknownParticipant(identifier.to_string());
            return self.reject("remove_participant", error);
        }
        if draft.payers().count() <= 1 {
            return self.reject("remove_participant", DraftError::NoPayers);
        }
        let total = self.parse_total(&draft.total_amount_due)?;

        draft.participants.retain(|p| p.identifier != identifier);
        self.rebalance_draft(&mut draft, total);
        Ok(draft)
    }

    /// Make someone else the creditor. The previous creditor becomes a clean payer.
    pub fn set_creditor(&self, mut draft: BillDraft, identifier: &str) -> Result<BillDraft> {
        info!("Setting creditor of draft {} to {}", draft.id, identifier);

        if draft.participant(identifier).is_none() {
            let error = DraftError::UnknownParticipant(identifier.to_string());
            return self.reject("set_creditor", error);
        }
        let total = self.parse_total(&draft.total_amount_due)?;

        draft.creditor_id = identifier.to_string();
        self.rebalance_draft(&mut draft, total);
        Ok(draft)
    }

    /// Change the bill total; manual edits are kept and the clean fields absorb the change
    pub fn update_total(&self, mut draft: BillDraft, total_amount_due: &str) -> Result<BillDraft> {
        let total = self.parse_total(total_amount_due)?;
        debug!("Updating total of draft {} to {}", draft.id, total);

        draft.total_amount_due = total.to_input_string(&self.currency);
        self.rebalance_draft(&mut draft, total);
        Ok(draft)
    }

    /// Throw away manual edits and split the total evenly across every payer
    pub fn rewind(&self, mut draft: BillDraft) -> Result<BillDraft> {
        info!("Rewinding split for draft {}", draft.id);

        let total = self.parse_total(&draft.total_amount_due)?;
        draft.participants =
            reset_even_split(&draft.participants, &draft.creditor_id, total, &self.currency);
        Ok(draft)
    }

    /// Current allocation state of a draft
    pub fn evaluate(&self, draft: &BillDraft) -> Result<AllocationReport> {
        let total = self.parse_total(&draft.total_amount_due)?;
        let report = evaluate_allocations(
            &draft.participants,
            &draft.creditor_id,
            total,
            self.minimum_contribution,
            &self.currency,
        );
        debug!("Draft {} allocation status: {}", draft.id, report.status);
        Ok(report)
    }

    /// Build the API payload for a balanced draft
    pub fn build_submission(&self, draft: &BillDraft) -> Result<CreateBillRequest> {
        let report = self.evaluate(draft)?;
        if !report.can_submit() {
            return self.reject("build_submission", DraftError::NotBalanced(report.status));
        }

        let mut shares = Vec::new();
        for payer in draft.payers() {
            let Some(units) = parse_contribution(payer, &self.currency).minor_units() else {
                let error = DraftError::NotBalanced(AllocationStatus::Invalid);
                return self.reject("build_submission", error);
            };
            shares.push(BillShare {
                identifier: payer.identifier.clone(),
                kind: payer.kind,
                amount: Amount::from_minor_units(units).to_input_string(&self.currency),
            });
        }

        info!("Draft {} is ready to submit with {} shares", draft.id, shares.len());
        Ok(CreateBillRequest {
            draft_id: draft.id.clone(),
            title: draft.title.clone(),
            total_amount_due: draft.total_amount_due.clone(),
            creditor_id: draft.creditor_id.clone(),
            shares,
        })
    }

    /// User-facing sentence for the allocation footer
    pub fn status_message(&self, report: &AllocationReport) -> String {
        let target = Amount::from_minor_units(report.target_minor_units);
        let difference = report
            .difference_minor_units
            .map(|units| Amount::from_minor_units(units.saturating_abs()));

        match (report.status, difference) {
            (AllocationStatus::Balanced, _) => {
                format!("All of {} has been allocated", target.display(&self.currency))
            }
            // Every entry parsed, so the sum itself overflowed
            (AllocationStatus::Invalid, _) if report.invalid_participants.is_empty() => {
                "The amounts entered are too large to add up".to_string()
            }
            (AllocationStatus::Invalid, _) => {
                "Some amounts are not valid. Please enter numbers only.".to_string()
            }
            (AllocationStatus::BelowMinimum, _) => format!(
                "Each participant must contribute at least {}",
                self.minimum_contribution.display(&self.currency)
            ),
            (AllocationStatus::Excess, Some(excess)) => format!(
                "Allocations exceed the bill total by {}",
                excess.display(&self.currency)
            ),
            (AllocationStatus::Deficit, Some(deficit)) => format!(
                "{} of {} is still unallocated",
                deficit.display(&self.currency),
                target.display(&self.currency)
            ),
            (AllocationStatus::Excess | AllocationStatus::Deficit, None) => {
                "Allocations don't match the bill total".to_string()
            }
        }
    }

    fn parse_total(&self, text: &str) -> Result<Amount> {
        match Amount::parse(text, &self.currency) {
            None => self.reject("parse_total", DraftError::InvalidTotal(text.to_string())),
            Some(total) if total.minor_units() <= 0 => {
                self.reject("parse_total", DraftError::TotalNotPositive)
            }
            Some(total) => Ok(total),
        }
    }

    fn check_participants(
        &self,
        participants: &[ParticipantContribution],
        creditor_id: &str,
    ) -> Result<()> {
        if participants.len() > self.config.max_participants {
            return self.reject(
                "create_draft",
                DraftError::TooManyParticipants(participants.len(), self.config.max_participants),
            );
        }

        let mut seen = HashSet::new();
        for participant in participants {
            if !seen.insert(participant.identifier.as_str()) {
                return self.reject(
                    "create_draft",
                    DraftError::DuplicateParticipant(participant.identifier.clone()),
                );
            }
        }

        if !seen.contains(creditor_id) {
            let error = DraftError::UnknownParticipant(creditor_id.to_string());
            return self.reject("create_draft", error);
        }
        if participants.len() < 2 {
            return self.reject("create_draft", DraftError::NoPayers);
        }
        Ok(())
    }

    fn rebalance_draft(&self, draft: &mut BillDraft, total: Amount) {
        draft.participants =
            rebalance(&draft.participants, &draft.creditor_id, total, &self.currency);
    }

    fn reject<T>(&self, operation: &str, error: DraftError) -> Result<T> {
        warn!("{} rejected: {}", operation, error);
        Err(error.into())
    }
}

impl Default for SplitBreakdownService {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered first, then unregistered; selection order kept within each group
fn order_participants(participants: Vec<ParticipantContribution>) -> Vec<ParticipantContribution> {
    let (mut registered, unregistered): (Vec<_>, Vec<_>) = participants
        .into_iter()
        .partition(|p| p.kind == ParticipantKind::Registered);
    registered.extend(unregistered);
    registered
}
