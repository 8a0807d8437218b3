//! Per-intent feedback aggregates with prior smoothing.

use chrono::Utc;
use sift_core::config::FeedbackConfig;
use sift_core::models::{FeedbackSample, IntentFeedbackStats};
use sift_core::FeedbackAction;

use crate::similarity::token_jaccard;

/// Fold every feedback sample of an intent into its metrics.
///
/// `acceptance_rate` is the smoothed share of suggestions accepted as-is.
/// `repetition_score` also credits edits by how much of the generated text
/// survived. Both start at `prior_score` and move toward the observed rate as
/// events accumulate past `prior_weight`.
pub fn aggregate(
    intent_id: &str,
    samples: &[FeedbackSample],
    config: &FeedbackConfig,
) -> IntentFeedbackStats {
    let mut accepts = 0u64;
    let mut edits = 0u64;
    let mut rejects = 0u64;
    let mut edit_similarity_sum = 0.0;

    for sample in samples {
        match sample.event.action {
            FeedbackAction::Accept => accepts += 1,
            FeedbackAction::Reject => rejects += 1,
            FeedbackAction::Edit => {
                edits += 1;
                let edited = sample.event.edited_text.as_deref().unwrap_or_default();
                edit_similarity_sum += token_jaccard(&sample.response_text, edited);
            }
        }
    }

    let total = (accepts + edits + rejects) as f64;
    let prior_mass = config.prior_weight * config.prior_score;
    let denominator = total + config.prior_weight;
    let smooth = |observed: f64| {
        if denominator <= 0.0 {
            config.prior_score
        } else {
            (observed + prior_mass) / denominator
        }
    };

    IntentFeedbackStats {
        intent_id: intent_id.to_string(),
        accepts,
        edits,
        rejects,
        edit_similarity_sum,
        acceptance_rate: smooth(accepts as f64).clamp(0.0, 1.0),
        repetition_score: smooth(accepts as f64 + edit_similarity_sum).clamp(0.0, 1.0),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::FeedbackEvent;

    fn sample(action: FeedbackAction, response: &str, edited: Option<&str>) -> FeedbackSample {
        FeedbackSample {
            event: FeedbackEvent {
                feedback_id: "f".into(),
                suggestion_id: "s".into(),
                action,
                edited_text: edited.map(str::to_string),
                rejection_reason: (action == FeedbackAction::Reject).then(|| "bad".to_string()),
                created_at: Utc::now(),
            },
            response_text: response.to_string(),
        }
    }

    #[test]
    fn no_events_yields_prior() {
        let stats = aggregate("i", &[], &FeedbackConfig::default());
        assert_eq!(stats.total_events(), 0);
        assert_eq!(stats.acceptance_rate, 0.5);
        assert_eq!(stats.repetition_score, 0.5);
    }

    #[test]
    fn smoothing_toward_observed_rate() {
        let config = FeedbackConfig {
            prior_weight: 2.0,
            prior_score: 0.5,
        };
        let samples = vec![
            sample(FeedbackAction::Accept, "a b", None),
            sample(FeedbackAction::Accept, "a b", None),
            sample(FeedbackAction::Edit, "refund issued today", Some("refund issued tomorrow")),
            sample(FeedbackAction::Reject, "a b", None),
        ];
        let stats = aggregate("i", &samples, &config);
        assert_eq!((stats.accepts, stats.edits, stats.rejects), (2, 1, 1));
        // (2 + 1) / (4 + 2)
        assert!((stats.acceptance_rate - 0.5).abs() < 1e-12);
        // (2 + 0.5 + 1) / (4 + 2)
        assert!((stats.repetition_score - 3.5 / 6.0).abs() < 1e-12);
        assert!((stats.edit_similarity_sum - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_prior_weight_uses_raw_rates() {
        let config = FeedbackConfig {
            prior_weight: 0.0,
            prior_score: 0.5,
        };
        let samples = vec![
            sample(FeedbackAction::Accept, "x", None),
            sample(FeedbackAction::Reject, "x", None),
        ];
        let stats = aggregate("i", &samples, &config);
        assert_eq!(stats.acceptance_rate, 0.5);
        assert_eq!(aggregate("i", &[], &config).acceptance_rate, 0.5);
    }

    proptest::proptest! {
        #[test]
        fn rates_bounded_and_accepts_never_lower_acceptance(
            actions in proptest::collection::vec(0u8..3, 0..30),
            prior_weight in 0.0f64..20.0,
        ) {
            let config = FeedbackConfig { prior_weight, prior_score: 0.5 };
            let mut samples: Vec<FeedbackSample> = actions
                .iter()
                .map(|a| match a {
                    0 => sample(FeedbackAction::Accept, "a b c", None),
                    1 => sample(FeedbackAction::Edit, "a b c", Some("a b d")),
                    _ => sample(FeedbackAction::Reject, "a b c", None),
                })
                .collect();
            let before = aggregate("i", &samples, &config);
            proptest::prop_assert!((0.0..=1.0).contains(&before.acceptance_rate));
            proptest::prop_assert!((0.0..=1.0).contains(&before.repetition_score));

            samples.push(sample(FeedbackAction::Accept, "a b c", None));
            let after = aggregate("i", &samples, &config);
            proptest::prop_assert!(after.acceptance_rate >= before.acceptance_rate - 1e-12);
        }
    }
}
