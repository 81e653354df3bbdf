//! Utility functions for text truncation, term splitting, and dates.
//!
//! This module provides helper functions used throughout the pipeline:
//! - Token truncation for digest bodies
//! - Splitting of comma-delimited term lists
//! - String truncation for logging
//! - JSON error detection for handling truncated model replies

use chrono::{Duration, Local, NaiveDate};

/// Keep the first `limit` whitespace-delimited tokens of `text`.
///
/// Tokens are rejoined with single spaces, so a body shorter than `limit`
/// comes back whitespace-normalized.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_tokens("a  b\n c d", 3), "a b c");
/// ```
pub fn truncate_tokens(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a comma-delimited term list.
///
/// Terms are kept literally: surrounding whitespace is not trimmed and empty
/// segments are preserved.
pub fn split_terms(terms: &str) -> Vec<&str> {
    terms.split(',').collect()
}

/// The local calendar date one day before today.
pub fn yesterday() -> NaiveDate {
    day_before(Local::now().date_naive())
}

pub fn day_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a
/// character boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When a model reply is cut off (e.g., due to token limits), the
/// resulting JSON will fail to parse with an EOF error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}
