//! Splitting raw upstream text back into per-segment translations

use crate::domain::DomainError;

/// Delimiter placed on its own line between segments
pub const SEGMENT_DELIMITER: &str = "---";

/// Separator used to join segments into the user prompt
pub const PROMPT_SEPARATOR: &str = "\n---\n";

/// Which parsing strategy produced the translations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Split on the `---` delimiter
    Delimited,
    /// Split on single newlines, ignoring bare delimiter lines
    LineBased,
}

impl ReconcileStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::LineBased => "line_based",
        }
    }
}

/// Translations recovered from one upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub translations: Vec<String>,
    pub strategy: ReconcileStrategy,
}

/// Joins segment texts into the user prompt sent upstream
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(PROMPT_SEPARATOR)
}

/// Parses `raw` into exactly `expected` non-empty translations.
///
/// The delimited split is tried first; the line-based split only runs when the
/// delimited count differs from `expected`. Pieces are never truncated, padded
/// or duplicated to force a match.
pub fn reconcile(raw: &str, expected: usize) -> Result<Reconciled, DomainError> {
    let normalized = raw.replace("\r\n", "\n");

    let delimited = split_delimited(&normalized);
    if delimited.len() == expected {
        return Ok(Reconciled {
            translations: delimited,
            strategy: ReconcileStrategy::Delimited,
        });
    }

    let line_based = split_lines(&normalized);
    if line_based.len() == expected {
        return Ok(Reconciled {
            translations: line_based,
            strategy: ReconcileStrategy::LineBased,
        });
    }

    Err(DomainError::reconciliation_mismatch(
        expected,
        delimited.len(),
        line_based.len(),
    ))
}

fn split_delimited(text: &str) -> Vec<String> {
    text.split(SEGMENT_DELIMITER)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != SEGMENT_DELIMITER)
        .map(str::to_string)
        .collect()
}
