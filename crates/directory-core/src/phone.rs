//! Phone number normalization and directory resolution
//!
//! Stored numbers and dialed numbers rarely share a format: the directory
//! may hold `"067 296 6361"` while the telephony provider reports
//! `"+27672966361"`. This module offers the canonicalization used for
//! comparison and the [`PhoneMatcher`] that resolves a query against a
//! directory snapshot.
//!
//! # Examples
//!
//! ```rust
//! use omnicall_directory_core::phone::{normalize, PhoneMatcher};
//!
//! assert_eq!(normalize("+1 (555) 123-4567"), "+15551234567");
//!
//! let directory = vec![("Alice", "555.123.4567")];
//! let matcher = PhoneMatcher::new();
//! let hit = matcher.resolve("555-123-4567", &directory);
//! assert_eq!(hit.map(|(name, _)| *name), Some("Alice"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::DirectoryEntry;

static DIALABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+?[0-9\s().\-]+$").expect("dialable pattern is valid"));

/// Anything that carries a stored phone number the matcher can compare against
pub trait PhoneRecord {
    /// Raw stored phone string, if the record has one
    fn stored_phone(&self) -> Option<&str>;
}

impl PhoneRecord for DirectoryEntry {
    fn stored_phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl<'a, T> PhoneRecord for (T, &'a str) {
    fn stored_phone(&self) -> Option<&str> {
        Some(self.1)
    }
}

/// Strip everything except decimal digits and a single leading `+`.
///
/// A `+` survives only when no digit has been kept before it, so
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
        } else if ch == '+' && out.is_empty() {
            out.push(ch);
        }
    }
    out
}

/// Whether `raw` looks like something a user could dial.
///
/// Accepts digits, spaces, `-`, `.`, parentheses and one leading `+`,
/// and requires at least one digit.
pub fn is_dialable(raw: &str) -> bool {
    DIALABLE_REGEX.is_match(raw) && raw.chars().any(|c| c.is_ascii_digit())
}

/// Rewrite a local number into international form for `country_code`.
///
/// - `+…` is kept as is
/// - `00…` becomes `+…`
/// - a single leading `0` is replaced by `+{country_code}`
/// - anything else is returned normalized, without guessing
pub fn to_international(raw: &str, country_code: &str) -> String {
    let number = normalize(raw);
    let cc = normalize(country_code);
    let cc = cc.trim_start_matches('+');

    if number.starts_with('+') || number.is_empty() {
        number
    } else if let Some(rest) = number.strip_prefix("00") {
        format!("+{}", rest)
    } else if let Some(rest) = number.strip_prefix('0') {
        if cc.is_empty() {
            number
        } else {
            format!("+{}{}", cc, rest)
        }
    } else {
        number
    }
}

/// Resolves phone strings to directory records under formatting skew
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneMatcher {
    country_code: Option<String>,
}

impl PhoneMatcher {
    /// Matcher that only tolerates separator differences
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher that additionally treats local (`0…`) and international
    /// (`+{cc}…`) forms of the same number as equal
    pub fn with_country_code(country_code: impl Into<String>) -> Self {
        Self {
            country_code: Some(country_code.into()),
        }
    }

    /// The configured country code, if any
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Resolve `query` against `directory`.
    ///
    /// Passes run in order and the first hit wins:
    /// 1. exact comparison with the raw stored string
    /// 2. comparison of [`normalize`]d forms
    /// 3. comparison of [`to_international`] forms, only with a country code
    ///
    /// Within a pass, ties resolve to the first record in iteration order.
    /// `None` means no identity is available; it is not an error.
    pub fn resolve<'a, T: PhoneRecord>(&self, query: &str, directory: &'a [T]) -> Option<&'a T> {
        if query.trim().is_empty() {
            return None;
        }

        if let Some(hit) = directory.iter().find(|r| r.stored_phone() == Some(query)) {
            return Some(hit);
        }

        let wanted = normalize(query);
        if !wanted.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        if let Some(hit) = directory
            .iter()
            .find(|r| r.stored_phone().map(normalize).as_deref() == Some(wanted.as_str()))
        {
            return Some(hit);
        }

        let cc = self.country_code.as_deref()?;
        let wanted = to_international(query, cc);
        directory.iter().find(|r| {
            r.stored_phone()
                .map(|p| to_international(p, cc))
                .as_deref()
                == Some(wanted.as_str())
        })
    }
}
