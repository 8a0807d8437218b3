//! Status transitions with their audit rows.

use chrono::Utc;
use sift_core::errors::ConflictError;
use sift_core::models::IntentTransition;
use sift_core::{Intent, IntentStatus};

/// Move `intent` to `to`, returning the audit row.
///
/// Activation additionally requires a cluster binding. The caller checks that no
/// other active intent holds the same cluster.
pub fn transition(
    intent: &mut Intent,
    to: IntentStatus,
    actor: &str,
    reason: Option<&str>,
) -> Result<IntentTransition, ConflictError> {
    let from = intent.status;
    if !from.can_transition_to(to) {
        return Err(ConflictError::InvalidTransition {
            intent_id: intent.intent_id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    if to == IntentStatus::Active && intent.cluster_id.is_none() {
        return Err(ConflictError::UnboundIntent {
            intent_id: intent.intent_id.clone(),
        });
    }

    let at = Utc::now();
    intent.status = to;
    intent.updated_at = at;
    Ok(IntentTransition {
        intent_id: intent.intent_id.clone(),
        from,
        to,
        actor: actor.to_string(),
        reason: reason.map(str::to_string),
        at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::RiskLevel;

    #[test]
    fn draft_needs_cluster_to_activate() {
        let mut intent = Intent::new_draft("Refunds", "", RiskLevel::Low);
        assert!(matches!(
            transition(&mut intent, IntentStatus::Active, "curator", None),
            Err(ConflictError::UnboundIntent { .. })
        ));
        assert_eq!(intent.status, IntentStatus::Draft);

        intent.cluster_id = Some(3);
        let audit = transition(&mut intent, IntentStatus::Active, "curator", Some("ok")).unwrap();
        assert_eq!(audit.from, IntentStatus::Draft);
        assert_eq!(audit.to, IntentStatus::Active);
        assert_eq!(audit.reason.as_deref(), Some("ok"));
        assert_eq!(intent.status, IntentStatus::Active);
    }

    #[test]
    fn inactive_cannot_return_to_draft() {
        let mut intent = Intent::new_draft("Refunds", "", RiskLevel::Low);
        transition(&mut intent, IntentStatus::Inactive, "curator", None).unwrap();
        assert!(matches!(
            transition(&mut intent, IntentStatus::Draft, "curator", None),
            Err(ConflictError::InvalidTransition { .. })
        ));
    }
}
