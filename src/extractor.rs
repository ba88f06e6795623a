//! # Candidate Extractor
//!
//! Third pipeline stage. Reduces a surviving normalized line to the bare
//! product-name token sequence the matcher works on. The normalizer only
//! strips the trailing code run; OCR output also leaves residual codes in
//! the middle of lines (interior barcodes, stray flags, pack sizes), which
//! are removed here. A line that loses every token produces no candidate
//! and is silently dropped.

use crate::config::EngineConfig;
use crate::normalizer::{is_flag_token, is_qty_token, is_upc_token, NormalizedLine};
use tracing::trace;

/// A line reduced to product-name tokens, ready for matching
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Product-name tokens in original order and case
    pub tokens: Vec<String>,
    /// Lowercase-joined form of `tokens`, used for matching
    pub matching: String,
    /// Zero-based index of the source line within the scan
    pub line_index: usize,
    /// Original line text, carried through to the final output
    pub raw_text: String,
}

fn is_pure_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Extract a candidate from a surviving line, or `None` if nothing
/// product-like remains
pub fn extract(line: &NormalizedLine, _config: &EngineConfig) -> Option<Candidate> {
    let mut tokens: Vec<String> = Vec::new();

    for token in line.display.split_whitespace() {
        let cleaned = token.trim_matches(|c: char| "-:;.,#".contains(c));
        if cleaned.is_empty() {
            continue;
        }
        if is_upc_token(cleaned)
            || is_flag_token(cleaned)
            || is_qty_token(cleaned)
            || is_pure_numeric(cleaned)
        {
            continue;
        }
        tokens.push(cleaned.to_string());
    }

    if tokens.is_empty() {
        trace!(index = line.index, "Line yielded no candidate tokens");
        return None;
    }

    // A product name has more letters than digits and at least a few
    // letters in total; anything else is residual code debris.
    let joined = tokens.join(" ");
    let letters = joined.chars().filter(|c| c.is_alphabetic()).count();
    let digits = joined.chars().filter(|c| c.is_ascii_digit()).count();
    if letters < 3 || letters < digits {
        trace!(index = line.index, joined = %joined, "Candidate rejected: not name-shaped");
        return None;
    }

    let matching = joined.to_lowercase();
    trace!(index = line.index, matching = %matching, "Extracted candidate");

    Some(Candidate {
        tokens,
        matching,
        line_index: line.index,
        raw_text: line.raw.clone(),
    })
}
