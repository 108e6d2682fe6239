// 💬 Chat Line Parser - "DATE, TIME - SENDER: MESSAGE" → ChatMessage
// First-occurrence delimiter scan + sentiment rules as data

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const DATE_SEP: &str = ", ";
const SENDER_SEP: &str = " - ";
const TEXT_SEP: &str = ": ";

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Funny,
    Love,
    Neutral,
}

/// One parsed line of a chat export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub date: String,
    pub time: String,
    pub sender: String,
    /// Message body exactly as it appeared (not trimmed)
    pub text: String,
    pub word_count: usize,
    pub sentiment: Sentiment,
}

impl ChatMessage {
    /// Rebuild the line this message was parsed from
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}",
            self.date, DATE_SEP, self.time, SENDER_SEP, self.sender, TEXT_SEP, self.text
        )
    }

    /// Date and time as a timestamp, when they follow `DD/MM/YYYY` and `HH:MM`
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let joined = format!("{} {}", self.date.trim(), self.time.trim());
        NaiveDateTime::parse_from_str(&joined, "%d/%m/%Y %H:%M").ok()
    }
}

// ============================================================================
// SENTIMENT RULES
// ============================================================================

/// Trigger substrings for each sentiment
///
/// Matching is case-insensitive. Funny triggers are checked before love
/// triggers, so a message matching both is funny.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRules {
    pub funny: Vec<String>,
    pub love: Vec<String>,
}

impl Default for SentimentRules {
    fn default() -> Self {
        SentimentRules {
            funny: vec!["😂".to_string(), ":)".to_string(), "haha".to_string()],
            love: vec!["❤".to_string(), "love".to_string(), "pyaar".to_string()],
        }
    }
}

impl SentimentRules {
    /// Load a rule set from JSON: `{"funny": [...], "love": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse sentiment rules JSON")
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();
        let hit = |triggers: &[String]| {
            triggers
                .iter()
                .any(|t| !t.is_empty() && lower.contains(&t.to_lowercase()))
        };

        if hit(&self.funny) {
            Sentiment::Funny
        } else if hit(&self.love) {
            Sentiment::Love
        } else {
            Sentiment::Neutral
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Word separator: Unicode whitespace plus the byte-order mark, minus NEL
///
/// Chat exports often carry a stray U+FEFF between words.
fn is_word_separator(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

/// Words in the trimmed text; whitespace-only text has none
pub fn word_count(text: &str) -> usize {
    text.split(is_word_separator).filter(|w| !w.is_empty()).count()
}

/// Parse one line with the default sentiment rules
pub fn parse_whatsapp_message(line: &str) -> Option<ChatMessage> {
    parse_with_rules(line, &SentimentRules::default())
}

/// Parse an untyped value; anything but a string is rejected
pub fn parse_whatsapp_message_value(value: &Value) -> Option<ChatMessage> {
    value.as_str().and_then(parse_whatsapp_message)
}

pub fn parse_with_rules(line: &str, rules: &SentimentRules) -> Option<ChatMessage> {
    if !line.contains(SENDER_SEP) || !line.contains(TEXT_SEP) {
        debug!(line, "missing sender or text separator");
        return None;
    }

    let date_end = line.find(DATE_SEP)?;
    let time_start = date_end + DATE_SEP.len();

    // first " - " anywhere; if it overlaps the date separator the line is malformed
    let dash = line.find(SENDER_SEP)?;
    if dash < time_start {
        debug!(line, "sender separator precedes time");
        return None;
    }
    let sender_start = dash + SENDER_SEP.len();

    // ": " must start at or after the " - "
    let colon = dash + line[dash..].find(TEXT_SEP)?;
    let text = &line[colon + TEXT_SEP.len()..];

    Some(ChatMessage {
        date: line[..date_end].to_string(),
        time: line[time_start..dash].to_string(),
        sender: line[sender_start..colon].to_string(),
        text: text.to_string(),
        word_count: word_count(text),
        sentiment: rules.classify(text),
    })
}

/// Parse every line of an in-memory export, skipping lines that don't parse
pub fn parse_chat_export(export: &str) -> Vec<ChatMessage> {
    export.lines().filter_map(parse_whatsapp_message).collect()
}
