/// Malformed feedback or curator input. Nothing is persisted when raised.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("edited_text is required for edit feedback")]
    MissingEditedText,

    #[error("rejection_reason is required for reject feedback")]
    MissingRejectionReason,

    #[error("edited_text is only allowed for edit feedback, got {action}")]
    UnexpectedEditedText { action: String },

    #[error("rejection_reason is only allowed for reject feedback, got {action}")]
    UnexpectedRejectionReason { action: String },

    #[error("suggestion {suggestion_id} does not exist")]
    UnknownSuggestion { suggestion_id: String },

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}
