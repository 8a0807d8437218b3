use serde::{Deserialize, Serialize};

/// One typed part of a generation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptSection {
    Preamble {
        text: String,
    },
    Policy {
        intent_name: String,
        description: String,
        policy: String,
        constraints: Vec<String>,
    },
    Example {
        customer: String,
        agent: String,
    },
    TicketContext {
        text: String,
    },
}

impl PromptSection {
    fn render(&self) -> String {
        match self {
            Self::Preamble { text } => text.clone(),
            Self::Policy {
                intent_name,
                description,
                policy,
                constraints,
            } => {
                let mut out = format!("Intent: {intent_name}\n{description}");
                if !policy.is_empty() {
                    out.push_str("\n\nPolicy:\n");
                    out.push_str(policy);
                }
                if !constraints.is_empty() {
                    out.push_str("\n\nConstraints:");
                    for c in constraints {
                        out.push_str("\n- ");
                        out.push_str(c);
                    }
                }
                out
            }
            Self::Example { customer, agent } => {
                format!("Example\nCustomer: {customer}\nAgent: {agent}")
            }
            Self::TicketContext { text } => format!("Ticket:\n{text}"),
        }
    }
}

/// Ordered prompt: preamble, policy, examples, ticket context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prompt {
    pub sections: Vec<PromptSection>,
}

impl Prompt {
    pub fn preamble(&self) -> Option<&str> {
        self.sections.iter().find_map(|s| match s {
            PromptSection::Preamble { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn examples(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s, PromptSection::Example { .. }))
            .count()
    }

    /// Everything except the preamble, in order.
    pub fn render_body(&self) -> String {
        self.sections
            .iter()
            .filter(|s| !matches!(s, PromptSection::Preamble { .. }))
            .map(PromptSection::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(PromptSection::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
