//! # Line Normalizer
//!
//! First pipeline stage. Takes one raw OCR line, trims and collapses
//! whitespace, and peels the trailing barcode/price/tax-flag run off the
//! end into a separate field. Token order and interior words are never
//! altered — the later stages depend on seeing the product name exactly as
//! the register printed it.
//!
//! The trailing suffix is the strongest structural signal on a receipt:
//! real product lines end in a UPC, a price, and one or two tax flags,
//! while store metadata does not. The noise filter uses that signal for
//! its keep/drop tie-break.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

lazy_static! {
    // Price-like tokens: $2.99, 3.84, 2,99, 45. The integer part is capped
    // at four digits so barcodes never read as prices.
    static ref PRICE_RE: Regex =
        Regex::new(r"^\$?\d{1,4}(?:[.,]\d{1,2})?$").expect("price pattern should be valid");
    // Quantity-pack tokens: 16OZ, 3LB, 12CT, 2PK, 1EA
    static ref QTY_RE: Regex = Regex::new(r"(?i)^\d+(?:\.\d+)?(?:oz|lb|lbs|ct|pk|pkg|ea)$")
        .expect("quantity pattern should be valid");
}

/// One line of OCR output with its position in the scan. Ephemeral,
/// produced and consumed within a single scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLine<'a> {
    pub text: &'a str,
    pub index: usize,
}

impl<'a> RawLine<'a> {
    pub fn new(text: &'a str, index: usize) -> Self {
        Self { text, index }
    }

    pub fn normalize(&self) -> NormalizedLine {
        normalize_line(self.text, self.index)
    }
}

/// A normalized line: cleaned display text, a lowercase matching form, and
/// the trailing code tokens stripped from the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLine {
    /// Original line text, untouched (carried through to the final output)
    pub raw: String,
    /// Trimmed, whitespace-collapsed text with the trailing suffix removed,
    /// case preserved
    pub display: String,
    /// Lowercase form of `display`, used for matching
    pub matching: String,
    /// Trailing barcode/price/flag tokens in their original order
    pub trailing: Vec<String>,
    /// Zero-based line index within the scan
    pub index: usize,
}

impl NormalizedLine {
    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Whether the stripped suffix contains a barcode or price token — the
    /// structural signature of a product line
    pub fn has_product_code(&self) -> bool {
        self.trailing
            .iter()
            .any(|t| is_upc_token(t) || is_price_token(t))
    }
}

/// Price token: a bare or dollar-prefixed amount
pub(crate) fn is_price_token(token: &str) -> bool {
    PRICE_RE.is_match(token)
}

/// Single-letter tax/fee flag printed after the price (F, N, O, T, X)
pub(crate) fn is_flag_token(token: &str) -> bool {
    token.len() == 1 && "fnotxFNOTX".contains(token)
}

/// UPC/EAN-like token: eight or more digits, hyphens allowed
pub(crate) fn is_upc_token(token: &str) -> bool {
    let compact: String = token.chars().filter(|c| *c != '-').collect();
    compact.len() >= 8 && compact.chars().all(|c| c.is_ascii_digit())
}

/// Quantity-pack token such as 16OZ or 12CT
pub(crate) fn is_qty_token(token: &str) -> bool {
    QTY_RE.is_match(token)
}

fn is_trailing_code_token(token: &str) -> bool {
    is_price_token(token) || is_flag_token(token) || is_upc_token(token) || is_qty_token(token)
}

/// Normalize one raw OCR line.
///
/// Empty input yields an empty normalized line, which the noise filter
/// rejects; there are no error conditions.
pub fn normalize_line(text: &str, index: usize) -> NormalizedLine {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();

    let mut trailing: Vec<String> = Vec::new();
    while let Some(last) = tokens.last() {
        if is_trailing_code_token(last) {
            trailing.push(last.to_string());
            tokens.pop();
        } else {
            break;
        }
    }
    trailing.reverse();

    let display = tokens.join(" ");
    let matching = display.to_lowercase();

    let disp = &display;
    trace!(
        index,
        display = %disp,
        trailing = ?trailing,
        "Normalized line"
    );

    NormalizedLine {
        raw: text.to_string(),
        display,
        matching,
        trailing,
        index,
    }
}
