//! Spanish (`es-ES`) string collation.
//!
//! Three comparison levels, in the order a browser's `localeCompare` applies
//! them: base letters first (case and accents ignored, `ñ` is a letter of its
//! own after `n`), then accents, then case with lowercase first. Whitespace
//! and punctuation sort before digits, digits before letters.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const WEIGHT_SPACE: u32 = 0x0001;
const WEIGHT_PUNCT: u32 = 0x0100;
const WEIGHT_DIGIT: u32 = 0x20_0000;
const WEIGHT_LATIN: u32 = 0x30_0000;
const WEIGHT_OTHER: u32 = 0x40_0000;

const COMBINING_TILDE: char = '\u{303}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CollationElement {
    primary: u32,
    secondary: u32,
    tertiary: u8,
}

/// Letters that carry a diacritic but have no canonical decomposition.
/// Returns the base letters and the secondary weight of the first one.
fn fold_atomic(c: char) -> Option<(&'static str, u32)> {
    match c {
        'ł' => Some(("l", 0x0337)),
        'ø' => Some(("o", 0x0338)),
        'đ' => Some(("d", 0x0335)),
        'ħ' => Some(("h", 0x0335)),
        'ŧ' => Some(("t", 0x0335)),
        'ı' => Some(("i", 0x0131)),
        'ß' => Some(("ss", 0x00df)),
        'æ' => Some(("ae", 0x00e6)),
        'œ' => Some(("oe", 0x0153)),
        _ => None,
    }
}

fn latin_rank(c: char) -> Option<u32> {
    match c {
        'a'..='n' => Some((c as u32 - 'a' as u32) * 2),
        'ñ' => Some(('n' as u32 - 'a' as u32) * 2 + 1),
        'o'..='z' => Some((c as u32 - 'a' as u32) * 2),
        _ => None,
    }
}

fn primary_weight(base: char) -> u32 {
    if base.is_whitespace() {
        WEIGHT_SPACE
    } else if let Some(d) = base.to_digit(10) {
        WEIGHT_DIGIT + d
    } else if let Some(rank) = latin_rank(base) {
        WEIGHT_LATIN + rank
    } else if base.is_alphanumeric() {
        WEIGHT_OTHER + base as u32
    } else {
        WEIGHT_PUNCT + base as u32
    }
}

fn base_element(base: char, secondary: u32, tertiary: u8) -> CollationElement {
    CollationElement {
        primary: primary_weight(base),
        secondary,
        tertiary,
    }
}

/// Splits `s` into collation elements after compatibility decomposition.
/// Combining marks become the secondary weight of the letter they follow,
/// except a tilde on `n`, which makes the letter `ñ`.
fn elements(s: &str) -> Vec<CollationElement> {
    let mut out: Vec<CollationElement> = Vec::with_capacity(s.len());
    let mut chars = s.nfkd().peekable();

    while let Some(c) = chars.next() {
        if is_combining_mark(c) {
            match out.last_mut() {
                Some(last) => {
                    if last.secondary == 0 {
                        last.secondary = c as u32;
                    }
                }
                None => out.push(base_element(c, 0, 0)),
            }
            continue;
        }

        let lower = c.to_lowercase().next().unwrap_or(c);
        let tertiary = u8::from(lower != c);

        if lower == 'n' && chars.peek() == Some(&COMBINING_TILDE) {
            chars.next();
            out.push(base_element('ñ', 0, tertiary));
            continue;
        }

        match fold_atomic(lower) {
            Some((bases, mark)) => {
                for (i, base) in bases.chars().enumerate() {
                    let secondary = if i == 0 { mark } else { 0 };
                    out.push(base_element(base, secondary, tertiary));
                }
            }
            None => out.push(base_element(lower, 0, tertiary)),
        }
    }
    out
}

/// Compares two strings the way the `es-ES` locale orders them.
///
/// Strings that tie on every level fall back to code point order, so the
/// result is a total order.
pub fn compare(a: &str, b: &str) -> Ordering {
    let ea = elements(a);
    let eb = elements(b);

    ea.iter()
        .map(|e| e.primary)
        .cmp(eb.iter().map(|e| e.primary))
        .then_with(|| ea.iter().map(|e| e.secondary).cmp(eb.iter().map(|e| e.secondary)))
        .then_with(|| ea.iter().map(|e| e.tertiary).cmp(eb.iter().map(|e| e.tertiary)))
        .then_with(|| a.cmp(b))
}
