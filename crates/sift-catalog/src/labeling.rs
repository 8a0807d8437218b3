//! Label proposals for curators.
//!
//! A proposal is only a suggestion: it never creates or activates an intent.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sift_core::constants::{EXAMPLE_TEXT_MAX_CHARS, UNLABELED_INTENT_NAME};
use sift_core::models::PromptSection;
use sift_core::traits::IGenerationService;
use sift_core::{ClusterSnapshot, Prompt, SiftResult, Ticket};
use tracing::debug;

/// Representative tickets sent to the generation service per proposal.
pub const LABEL_SAMPLE_SIZE: usize = 5;

const LABEL_INSTRUCTIONS: &str = "You name recurring customer support intents. Read the \
tickets below, which all belong to one group, and answer with JSON only: \
{\"name\": \"<short intent name>\", \"description\": \"<one sentence>\"}.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelProposal {
    pub cluster_id: u32,
    pub name: String,
    pub description: String,
    pub representative_ticket_ids: Vec<String>,
}

#[derive(Deserialize)]
struct RawLabel {
    name: String,
    #[serde(default)]
    description: String,
}

/// Ask the generation service to name a cluster from its representative tickets.
///
/// `tickets` must contain the representatives; others are ignored. Generation
/// errors propagate, unparsable answers fall back to [`UNLABELED_INTENT_NAME`].
pub async fn propose_label(
    generator: &dyn IGenerationService,
    snapshot: &ClusterSnapshot,
    cluster_id: u32,
    tickets: &[Ticket],
) -> SiftResult<LabelProposal> {
    let representatives = snapshot.representatives(cluster_id, LABEL_SAMPLE_SIZE);
    let mut sections = vec![PromptSection::Preamble {
        text: LABEL_INSTRUCTIONS.to_string(),
    }];
    let mut used = Vec::new();
    for id in &representatives {
        if let Some(ticket) = tickets.iter().find(|t| &t.ticket_id == id) {
            sections.push(PromptSection::TicketContext {
                text: truncate_chars(&ticket.text, EXAMPLE_TEXT_MAX_CHARS),
            });
            used.push(id.clone());
        }
    }

    let raw = generator.generate(&Prompt { sections }).await?;
    let (name, description) = parse_label(&raw);
    debug!(cluster = cluster_id, name = %name, "label proposed");
    Ok(LabelProposal {
        cluster_id,
        name,
        description,
        representative_ticket_ids: used,
    })
}

/// Parse `{name, description}` from a reply, tolerating a fenced code block.
pub fn parse_label(raw: &str) -> (String, String) {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").ok());

    let body = fence
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim();

    match serde_json::from_str::<RawLabel>(body) {
        Ok(label) if !label.name.trim().is_empty() => {
            (label.name.trim().to_string(), label.description.trim().to_string())
        }
        _ => (UNLABELED_INTENT_NAME.to_string(), String::new()),
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fenced_json() {
        let plain = r#"{"name": "Refund request", "description": "Customer wants money back."}"#;
        assert_eq!(
            parse_label(plain),
            ("Refund request".to_string(), "Customer wants money back.".to_string())
        );

        let fenced = "Sure!\n```json\n{\"name\": \"Password reset\"}\n```";
        assert_eq!(parse_label(fenced), ("Password reset".to_string(), String::new()));
    }

    #[test]
    fn falls_back_when_unparsable() {
        assert_eq!(parse_label("no idea").0, UNLABELED_INTENT_NAME);
        assert_eq!(parse_label(r#"{"name": "  "}"#).0, UNLABELED_INTENT_NAME);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }
}
