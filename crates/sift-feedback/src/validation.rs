//! Field rules for feedback requests.

use sift_core::errors::ValidationError;
use sift_core::models::FeedbackRequest;
use sift_core::FeedbackAction;

/// Normalize and check a request.
///
/// Blank strings count as absent. `edited_text` is present iff the action is
/// edit; `rejection_reason` is present iff the action is reject.
pub fn validate(request: &FeedbackRequest) -> Result<FeedbackRequest, ValidationError> {
    if request.suggestion_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "suggestion_id".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    let edited_text = non_blank(request.edited_text.as_deref());
    let rejection_reason = non_blank(request.rejection_reason.as_deref());
    let action = request.action;

    match (action, &edited_text, &rejection_reason) {
        (FeedbackAction::Edit, None, _) => return Err(ValidationError::MissingEditedText),
        (FeedbackAction::Reject, _, None) => return Err(ValidationError::MissingRejectionReason),
        (FeedbackAction::Accept | FeedbackAction::Reject, Some(_), _) => {
            return Err(ValidationError::UnexpectedEditedText {
                action: action.to_string(),
            })
        }
        (FeedbackAction::Accept | FeedbackAction::Edit, _, Some(_)) => {
            return Err(ValidationError::UnexpectedRejectionReason {
                action: action.to_string(),
            })
        }
        _ => {}
    }

    Ok(FeedbackRequest {
        suggestion_id: request.suggestion_id.clone(),
        action,
        edited_text,
        rejection_reason,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_requests() {
        assert!(validate(&FeedbackRequest::accept("s1")).is_ok());
        assert!(validate(&FeedbackRequest::edit("s1", "better wording")).is_ok());
        assert!(validate(&FeedbackRequest::reject("s1", "wrong policy")).is_ok());
    }

    #[test]
    fn blank_counts_as_absent() {
        assert!(matches!(
            validate(&FeedbackRequest::reject("s1", "   ")),
            Err(ValidationError::MissingRejectionReason)
        ));
        assert!(matches!(
            validate(&FeedbackRequest::edit("s1", "")),
            Err(ValidationError::MissingEditedText)
        ));

        let mut accept = FeedbackRequest::accept("s1");
        accept.rejection_reason = Some(" ".into());
        let normalized = validate(&accept).unwrap();
        assert_eq!(normalized.rejection_reason, None);
    }

    #[test]
    fn fields_only_allowed_for_their_action() {
        let mut accept = FeedbackRequest::accept("s1");
        accept.edited_text = Some("x".into());
        assert!(matches!(
            validate(&accept),
            Err(ValidationError::UnexpectedEditedText { .. })
        ));

        let mut edit = FeedbackRequest::edit("s1", "x");
        edit.rejection_reason = Some("nope".into());
        assert!(matches!(
            validate(&edit),
            Err(ValidationError::UnexpectedRejectionReason { .. })
        ));

        let mut reject = FeedbackRequest::reject("s1", "nope");
        reject.edited_text = Some("x".into());
        assert!(matches!(
            validate(&reject),
            Err(ValidationError::UnexpectedEditedText { .. })
        ));
    }

    #[test]
    fn empty_suggestion_id_is_rejected() {
        assert!(matches!(
            validate(&FeedbackRequest::accept(" ")),
            Err(ValidationError::InvalidField { .. })
        ));
    }
}
