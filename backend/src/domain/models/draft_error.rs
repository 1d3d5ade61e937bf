use shared::AllocationStatus;

/// Reasons a bill draft operation is refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Bill title cannot be empty")]
    EmptyTitle,
    #[error("Bill title is too long ({0} characters)")]
    TitleTooLong(usize),
    #[error("Bill total '{0}' is not a valid amount")]
    InvalidTotal(String),
    #[error("Bill total must be greater than zero")]
    TotalNotPositive,
    #[error("A bill needs at least one participant besides the creditor")]
    NoPayers,
    #[error("Too many participants ({0}), maximum is {1}")]
    TooManyParticipants(usize, usize),
    #[error("Participant '{0}' appears more than once")]
    DuplicateParticipant(String),
    #[error("Participant '{0}' is not part of this bill")]
    UnknownParticipant(String),
    #[error("The creditor's own contribution cannot be edited")]
    CreditorNotEditable,
    #[error("The creditor cannot be removed from the bill")]
    CannotRemoveCreditor,
    #[error("Allocations are not balanced ({0})")]
    NotBalanced(AllocationStatus),
}
