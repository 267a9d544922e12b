//! Clean-up of raw generated text.
//!
//! Generators may echo the prompt, loop on a sentence, or stop mid-word.
//! Suggestions are cut to two distinct sentences ending in a period; chat
//! replies only lose the echo and model artifacts.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Special tokens some chat models leak into plain completions.
static SPECIAL_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|[a-z_]+\|>|</?s>|<unused\d+>").expect("valid regex"));

const SUGGESTION_SENTENCES: usize = 2;

/// Remove a leading copy of `prompt` from `generated`.
pub fn strip_prompt_echo(prompt: &str, generated: &str) -> String {
    let prompt = prompt.trim();
    let text = generated.trim_start();
    if !prompt.is_empty() {
        if let Some(rest) = text.strip_prefix(prompt) {
            return rest.trim().to_string();
        }
    }
    text.trim().to_string()
}

fn normalize(text: &str) -> String {
    let text = SPECIAL_TOKEN_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

/// Split after `.`, `!` or `?` when followed by whitespace or the end.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Drop repeated sentences (case-insensitive), keeping first occurrences.
pub fn dedupe_sentences(sentences: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    sentences
        .into_iter()
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

/// Two-sentence treatment suggestion. Empty when nothing usable remains.
pub fn clean_suggestion(prompt: &str, raw: &str) -> String {
    let text = normalize(&strip_prompt_echo(prompt, raw));
    let sentences = dedupe_sentences(split_sentences(&text));
    let mut result = sentences
        .into_iter()
        .take(SUGGESTION_SENTENCES)
        .collect::<Vec<_>>()
        .join(" ");
    if result.is_empty() {
        return result;
    }
    if !result.ends_with('.') {
        result.push('.');
    }
    result
}

pub fn clean_chat_reply(prompt: &str, raw: &str) -> String {
    let text = SPECIAL_TOKEN_RE.replace_all(raw, "");
    strip_prompt_echo(prompt, &text)
}
