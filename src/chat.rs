//! Health chatbot: general questions and patient-specific questions.
//!
//! A patient-specific question must name a condition keyword so the right
//! record can be embedded in the prompt. Apologies (unknown condition, no
//! record, generator down) are returned to the caller but never stored in
//! the session history.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{self, DatabaseError};
use crate::generation::{postprocess, prompt, TextGenerator, CHAT_MAX_TOKENS};
use crate::models::{Disease, LabelledValues};

/// Keywords checked in this order; the first one present wins.
const CONDITION_KEYWORDS: &[(&str, Disease)] = &[
    ("diabetic", Disease::Diabetes),
    ("heart disease", Disease::HeartDisease),
    ("parkinsons", Disease::Parkinsons),
];

pub const UNKNOWN_CONDITION_REPLY: &str =
    "Sorry, I'm not sure which condition you're asking about. Please try again.";

pub const GENERATION_FAILED_REPLY: &str =
    "Sorry, I couldn't generate a response right now. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    pub user: String,
    pub bot: String,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            patient_id: None,
            user: user.into(),
            bot: bot.into(),
        }
    }

    pub fn for_patient(patient_id: i64, user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::new(user, bot)
        }
    }
}

/// Result of one chatbot question.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// A generated answer, to be appended to the history.
    Answered(ChatTurn),
    /// A fixed reply shown once and not recorded.
    Apology(String),
}

impl ChatOutcome {
    pub fn reply(&self) -> &str {
        match self {
            ChatOutcome::Answered(turn) => &turn.bot,
            ChatOutcome::Apology(text) => text,
        }
    }
}

/// Condition named in a question (case-insensitive).
pub fn detect_condition(query: &str) -> Option<(&'static str, Disease)> {
    let query = query.to_lowercase();
    CONDITION_KEYWORDS
        .iter()
        .find(|(keyword, _)| query.contains(keyword))
        .copied()
}

fn generate_reply(generator: &dyn TextGenerator, prompt: &str) -> Option<String> {
    match generator.generate(prompt, CHAT_MAX_TOKENS) {
        Ok(raw) => {
            let reply = postprocess::clean_chat_reply(prompt, &raw);
            if reply.is_empty() {
                None
            } else {
                Some(reply)
            }
        }
        Err(e) => {
            tracing::warn!(model = generator.model_name(), error = %e, "Chat generation failed");
            None
        }
    }
}

pub fn general_reply(generator: &dyn TextGenerator, query: &str) -> ChatOutcome {
    let prompt = prompt::general_chat_prompt(query);
    match generate_reply(generator, &prompt) {
        Some(reply) => ChatOutcome::Answered(ChatTurn::new(query.trim(), reply)),
        None => ChatOutcome::Apology(GENERATION_FAILED_REPLY.to_string()),
    }
}

/// Stored measurements for `disease`, rendered for a prompt.
fn record_text(
    conn: &Connection,
    disease: Disease,
    patient_id: i64,
) -> Result<Option<String>, DatabaseError> {
    let text = match disease {
        Disease::Diabetes => db::get_diabetes_record(conn, patient_id)?
            .map(|r| r.measurements.describe()),
        Disease::HeartDisease => db::get_heart_disease_record(conn, patient_id)?
            .map(|r| r.measurements.describe()),
        Disease::Parkinsons => db::get_parkinsons_record(conn, patient_id)?
            .map(|r| r.measurements.describe()),
    };
    Ok(text)
}

/// Answer a question about one patient's stored record.
///
/// Blocking: reads SQLite and calls the generator.
pub fn patient_reply(
    conn: &Connection,
    generator: &dyn TextGenerator,
    patient_id: i64,
    query: &str,
) -> Result<ChatOutcome, DatabaseError> {
    let Some((keyword, disease)) = detect_condition(query) else {
        return Ok(ChatOutcome::Apology(UNKNOWN_CONDITION_REPLY.to_string()));
    };

    let Some(record) = record_text(conn, disease, patient_id)? else {
        return Ok(ChatOutcome::Apology(format!(
            "Sorry, no data found for Patient ID {patient_id} related to {keyword}."
        )));
    };

    let prompt = prompt::patient_chat_prompt(patient_id, query, &record);
    Ok(match generate_reply(generator, &prompt) {
        Some(reply) => ChatOutcome::Answered(ChatTurn::for_patient(patient_id, query.trim(), reply)),
        None => ChatOutcome::Apology(GENERATION_FAILED_REPLY.to_string()),
    })
}
