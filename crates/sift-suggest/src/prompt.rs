//! Typed prompt assembly: preamble, policy, examples, ticket.

use sift_core::constants::EXAMPLE_TEXT_MAX_CHARS;
use sift_core::models::{PromptSection, PromptTemplate};
use sift_core::{Intent, Prompt, Ticket};

pub struct PromptAssembler {
    preamble: String,
    examples_per_prompt: usize,
}

impl PromptAssembler {
    pub fn new(preamble: &str, examples_per_prompt: usize) -> Self {
        Self {
            preamble: preamble.to_string(),
            examples_per_prompt,
        }
    }

    /// Without a template the policy section carries only the intent name and description.
    ///
    /// Examples come from `candidates` in order: tickets with an agent reply, never
    /// the ticket being answered, both sides truncated.
    pub fn assemble(
        &self,
        intent: &Intent,
        template: Option<&PromptTemplate>,
        candidates: &[Ticket],
        ticket: &Ticket,
    ) -> Prompt {
        let mut sections = Vec::with_capacity(3 + self.examples_per_prompt);
        sections.push(PromptSection::Preamble {
            text: self.preamble.clone(),
        });
        sections.push(PromptSection::Policy {
            intent_name: intent.name.clone(),
            description: intent.description.clone(),
            policy: template.map(|t| t.policy.clone()).unwrap_or_default(),
            constraints: template.map(|t| t.constraints.clone()).unwrap_or_default(),
        });

        let examples = candidates
            .iter()
            .filter(|c| c.ticket_id != ticket.ticket_id)
            .filter_map(|c| {
                let reply = c.agent_reply.as_deref()?.trim();
                (!reply.is_empty()).then(|| PromptSection::Example {
                    customer: truncate(&c.text),
                    agent: truncate(reply),
                })
            })
            .take(self.examples_per_prompt);
        sections.extend(examples);

        sections.push(PromptSection::TicketContext {
            text: ticket.text.clone(),
        });
        Prompt { sections }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(EXAMPLE_TEXT_MAX_CHARS).collect()
}
