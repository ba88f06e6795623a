//! # Noise Filter
//!
//! Second pipeline stage. Receipts interleave item lines with store
//! metadata in no fixed schema, so a line is classified by structural
//! signature rather than semantic understanding: an ordered list of named
//! recognizer rules, each a pure predicate over the normalized line.
//!
//! Rules come in two strengths. Hard rules (addresses, payment data,
//! personnel, totals) drop a line unconditionally. The soft promotional
//! rules are overridden when the line carries a trailing barcode/price
//! suffix — the signature of a real product line wins the tie.

use crate::config::EngineConfig;
use crate::normalizer::NormalizedLine;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

lazy_static! {
    // Street-address lines: street number, optional direction, street type
    static ref ADDRESS_RE: Regex = Regex::new(
        r"(?x)^\d{1,5}\s+
          (?:(?:n|s|e|w|ne|nw|se|sw)\.?\s+)?
          [a-z][a-z\ .']*?\s*
          (?:ave(?:nue)?|st(?:reet)?|rd|road|blvd|boulevard|dr(?:ive)?|hwy|highway|ln|lane|pkwy|parkway|ct|court)\.?$"
    )
    .expect("address pattern should be valid");
    // City/state/ZIP lines
    static ref CITY_STATE_ZIP_RE: Regex =
        Regex::new(r"\b[a-z]{2}\s+\d{5}(?:-\d{4})?$").expect("city/state pattern should be valid");
    // Payment and transaction metadata
    static ref PAYMENT_RE: Regex = Regex::new(
        r"(?x)\b(?:account|acct|appr(?:oval)?\s*code|declined|visa|mastercard|amex|american\ express|discover|debit|credit|eft|tender|cash|chip\s+read|swiped|network\s+id|ref\s*\#)\b"
    )
    .expect("payment pattern should be valid");
    // Register bookkeeping codes (TC#, ST#, OP#, TE#, TR#)
    static ref REGISTER_RE: Regex =
        Regex::new(r"\b(?:tc|st|op|te|tr)\s*\#").expect("register pattern should be valid");
    // Named-role personnel lines
    static ref PERSONNEL_RE: Regex =
        Regex::new(r"\b(?:manager|mgr|cashier|associate|clerk|server)\b")
            .expect("personnel pattern should be valid");
    // Totals, subtotals, tax, and change lines
    static ref TOTALS_RE: Regex = Regex::new(
        r"\b(?:sub\s*total|total|tax|change|balance|amount\s+due)\b"
    )
    .expect("totals pattern should be valid");
    // Marketing and storefront copy
    static ref PROMO_RE: Regex = Regex::new(
        r"(?x)\b(?:thank\ you|thanks\ for|save\ money|live\ better|low\ prices|
           how\ did\ we\ do|survey|feedback|coupon|rewards|visit\ us|www\.|\.com|
           supercenter|store\ \#)\b"
    )
    .expect("promo pattern should be valid");
}

/// Whether a matching rule drops the line unconditionally or can be
/// overridden by a trailing product-code suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Hard,
    Soft,
}

struct NoiseRule {
    name: &'static str,
    kind: RuleKind,
    matches: fn(&NormalizedLine, &EngineConfig) -> bool,
}

fn address_rule(line: &NormalizedLine, _cfg: &EngineConfig) -> bool {
    if ADDRESS_RE.is_match(&line.matching) {
        return true;
    }
    // A ZIP+4 token looks like a barcode to the normalizer, so the
    // city/state check has to see the stripped suffix too.
    if line.trailing.is_empty() {
        CITY_STATE_ZIP_RE.is_match(&line.matching)
    } else {
        let full = format!("{} {}", line.matching, line.trailing.join(" ")).to_lowercase();
        CITY_STATE_ZIP_RE.is_match(&full)
    }
}

fn payment_rule(line: &NormalizedLine, _cfg: &EngineConfig) -> bool {
    PAYMENT_RE.is_match(&line.matching) || REGISTER_RE.is_match(&line.matching)
}

fn personnel_rule(line: &NormalizedLine, _cfg: &EngineConfig) -> bool {
    PERSONNEL_RE.is_match(&line.matching)
}

fn totals_rule(line: &NormalizedLine, _cfg: &EngineConfig) -> bool {
    TOTALS_RE.is_match(&line.matching)
}

fn promo_rule(line: &NormalizedLine, _cfg: &EngineConfig) -> bool {
    PROMO_RE.is_match(&line.matching)
}

/// Free text with no embedded code and more words than any product line:
/// marketing copy, not an item
fn promo_shape_rule(line: &NormalizedLine, cfg: &EngineConfig) -> bool {
    line.trailing.is_empty()
        && !line.display.chars().any(|c| c.is_ascii_digit())
        && line.display.split(' ').count() > cfg.max_promo_words
}

static RULES: &[NoiseRule] = &[
    NoiseRule {
        name: "address",
        kind: RuleKind::Hard,
        matches: address_rule,
    },
    NoiseRule {
        name: "payment",
        kind: RuleKind::Hard,
        matches: payment_rule,
    },
    NoiseRule {
        name: "personnel",
        kind: RuleKind::Hard,
        matches: personnel_rule,
    },
    NoiseRule {
        name: "totals",
        kind: RuleKind::Hard,
        matches: totals_rule,
    },
    NoiseRule {
        name: "promo",
        kind: RuleKind::Soft,
        matches: promo_rule,
    },
    NoiseRule {
        name: "promo-shape",
        kind: RuleKind::Soft,
        matches: promo_shape_rule,
    },
];

/// Classify a normalized line, returning the name of the first rule that
/// drops it, or `None` for a candidate grocery line
pub fn classify(line: &NormalizedLine, config: &EngineConfig) -> Option<&'static str> {
    if line.display.len() < config.min_line_len {
        return Some("short-line");
    }

    for rule in RULES {
        if !(rule.matches)(line, config) {
            continue;
        }
        match rule.kind {
            RuleKind::Hard => {
                trace!(index = line.index, rule = rule.name, "Line dropped as noise");
                return Some(rule.name);
            }
            RuleKind::Soft => {
                if line.has_product_code() {
                    debug!(
                        index = line.index,
                        rule = rule.name,
                        "Line kept despite soft noise rule: trailing product code present"
                    );
                } else {
                    trace!(index = line.index, rule = rule.name, "Line dropped as noise");
                    return Some(rule.name);
                }
            }
        }
    }

    None
}

/// Whether the line is noise and should be dropped
pub fn is_noise(line: &NormalizedLine, config: &EngineConfig) -> bool {
    classify(line, config).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_line;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_address_lines_are_noise() {
        let cfg = config();
        assert_eq!(
            classify(&normalize_line("8885 N FLORIDA AVE", 0), &cfg),
            Some("address")
        );
        assert_eq!(
            classify(&normalize_line("TAMPA FL 33604", 0), &cfg),
            Some("address")
        );
    }

    #[test]
    fn test_payment_lines_are_noise() {
        let cfg = config();
        assert_eq!(
            classify(&normalize_line("ACCOUNT : 5259", 0), &cfg),
            Some("payment")
        );
        assert_eq!(
            classify(&normalize_line("APPR CODE 827441", 0), &cfg),
            Some("payment")
        );
        assert_eq!(
            classify(&normalize_line("US DEBIT DECLINED", 0), &cfg),
            Some("payment")
        );
        assert_eq!(
            classify(&normalize_line("ST# 02238 OP# 009144 TE# 17", 0), &cfg),
            Some("payment")
        );
    }

    #[test]
    fn test_personnel_lines_are_noise() {
        let cfg = config();
        assert_eq!(
            classify(&normalize_line("Manager COLLEEN BRICKEY", 0), &cfg),
            Some("personnel")
        );
    }

    #[test]
    fn test_totals_lines_are_noise_even_with_price_suffix() {
        let cfg = config();
        // The trailing price is stripped by the normalizer, but totals are
        // a hard rule and drop regardless of the code suffix.
        assert_eq!(
            classify(&normalize_line("TOTAL 45.67", 0), &cfg),
            Some("totals")
        );
        assert_eq!(
            classify(&normalize_line("SUBTOTAL 42.10", 0), &cfg),
            Some("totals")
        );
        assert_eq!(
            classify(&normalize_line("TAX 1 3.57", 0), &cfg),
            Some("totals")
        );
        assert_eq!(
            classify(&normalize_line("CHANGE DUE 4.33", 0), &cfg),
            Some("totals")
        );
    }

    #[test]
    fn test_marketing_copy_is_noise() {
        let cfg = config();
        assert_eq!(
            classify(&normalize_line("THANK YOU FOR SHOPPING", 0), &cfg),
            Some("promo")
        );
        assert_eq!(
            classify(&normalize_line("EVERYDAY GREAT DEALS ON THINGS YOU LOVE", 0), &cfg),
            Some("promo-shape")
        );
    }

    #[test]
    fn test_product_code_overrides_soft_rules_only() {
        let cfg = config();
        // Long wordy line, but the trailing barcode marks it as a product.
        let kept = normalize_line("HONEY ROASTED PEANUT SNACK MIX DELUXE 012345678901 3.99 N", 0);
        assert_eq!(classify(&kept, &cfg), None);

        // Same shape without the code run is marketing copy.
        let dropped = normalize_line("HONEY ROASTED PEANUT SNACK MIX DELUXE", 0);
        assert_eq!(classify(&dropped, &cfg), Some("promo-shape"));
    }

    #[test]
    fn test_product_lines_survive() {
        let cfg = config();
        assert!(!is_noise(
            &normalize_line("GV PNT BUTTR 007874237003 F 3.84 N", 0),
            &cfg
        ));
        assert!(!is_noise(&normalize_line("BREAD 007225003712 F 2.88 N", 0), &cfg));
        assert!(!is_noise(&normalize_line("EGGS 38871459 F", 0), &cfg));
    }

    #[test]
    fn test_short_and_empty_lines_are_noise() {
        let cfg = config();
        assert_eq!(classify(&normalize_line("", 0), &cfg), Some("short-line"));
        assert_eq!(classify(&normalize_line("AB", 0), &cfg), Some("short-line"));
        // A digits-only line loses everything to the suffix strip.
        assert_eq!(
            classify(&normalize_line("0123456789012", 0), &cfg),
            Some("short-line")
        );
    }
}
