//! Ordered trigger-phrase lookup over the configured FAQ entries.

use std::{collections::HashSet, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// One FAQ entry as it appears in a profile.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    /// Phrase whose presence in a message selects this entry.
    pub trigger: String,
    /// Canned answer sent verbatim.
    pub answer: String,
    /// Question shown in the `/faq` listing; derived from the trigger when absent.
    #[serde(default)]
    pub question: Option<String>,
}

impl FaqEntry {
    pub fn new(trigger: &str, answer: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            answer: answer.to_string(),
            question: None,
        }
    }

    /// The question to show for this entry in the FAQ listing.
    pub fn display_question(&self) -> String {
        match &self.question {
            Some(question) => question.clone(),
            None => format!("{}?", title_case(&self.trigger)),
        }
    }
}

/// Immutable, ordered FAQ index.
///
/// Entries keep their configuration order and the first entry whose trigger is
/// contained in the text wins. It is trivially cloneable.
#[derive(Debug, Clone, Default)]
pub struct FaqIndex {
    entries: Arc<[FaqEntry]>,
}

impl FaqIndex {
    /// Build the index, normalizing triggers to trimmed lower-case.
    ///
    /// Empty and duplicate triggers are rejected.
    pub fn new(entries: impl IntoIterator<Item = FaqEntry>) -> Res<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();

        for mut entry in entries {
            entry.trigger = entry.trigger.trim().to_lowercase();

            if entry.trigger.is_empty() {
                return Err(anyhow::anyhow!("FAQ triggers must not be empty (answer: {:?}).", entry.answer));
            }

            if !seen.insert(entry.trigger.clone()) {
                return Err(anyhow::anyhow!("Duplicate FAQ trigger: {:?}.", entry.trigger));
            }

            normalized.push(entry);
        }

        Ok(Self { entries: normalized.into() })
    }

    /// Return the answer of the first entry whose trigger occurs in `normalized_text`.
    pub fn lookup(&self, normalized_text: &str) -> Option<&str> {
        self.entries.iter().find(|entry| normalized_text.contains(entry.trigger.as_str())).map(|entry| entry.answer.as_str())
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Upper-case every letter that follows a non-letter and lower-case the rest.
fn title_case(text: &str) -> String {
    let mut after_letter = false;

    text.chars()
        .flat_map(|c| {
            let mapped: Vec<char> = if !c.is_alphabetic() {
                vec![c]
            } else if after_letter {
                c.to_lowercase().collect()
            } else {
                c.to_uppercase().collect()
            };
            after_letter = c.is_alphabetic();
            mapped
        })
        .collect()
}
