use std::sync::LazyLock;

use rand::{Rng, distr::Alphanumeric};
use regex::Regex;

use crate::{
    error::ParseError,
    types::{DEFAULT_TRACK_COUNT, PlaylistRequest},
};

// Unicode-aware, so full-width and Arabic-Indic digits count too.
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));
static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern is valid"));

/// Length of the OAuth `state` value binding a login link to a chat.
pub const CORRELATION_TOKEN_LEN: usize = 32;

/// Splits a free-text request into a search query and a track count.
///
/// The count is the largest number in the text (20 when there is none) and
/// the query is the text with every number removed. `"10 20 rock"` asks for
/// 20 tracks of `"rock"`. Any Unicode decimal digit counts, so `"５０ jpop"`
/// asks for 50 tracks. Numbers too large for a `u32` saturate.
pub fn parse_request(text: &str) -> Result<PlaylistRequest, ParseError> {
    let count = DIGIT_RUN
        .find_iter(text)
        .map(|m| digit_run_value(m.as_str()))
        .max()
        .unwrap_or(DEFAULT_TRACK_COUNT);

    let query = DIGIT_RUN.replace_all(text, "").trim().to_string();
    if query.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(PlaylistRequest { query, count })
}

fn digit_run_value(run: &str) -> u32 {
    run.chars()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(10)?.checked_add(decimal_digit_value(c))
        })
        .unwrap_or(u32::MAX)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a Unicode decimal digit.
///
/// Decimal digits are laid out in contiguous blocks of ten starting at zero,
/// and adjacent blocks (the mathematical alphanumerics) always start on a
/// zero, so the value is the distance to the start of the run modulo ten.
fn decimal_digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    (c as u32 - start) % 10
}

pub fn generate_correlation_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CORRELATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Cuts `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Flattens `text` onto one line and cuts it to `max` characters, for echoing
/// user input inside a longer message.
pub fn excerpt(text: &str, max: usize) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&line, max)
}
