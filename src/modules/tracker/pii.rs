//! Detection of personally identifiable information in tracking payloads.
//!
//! Text is percent-decoded and split on URL and JSON punctuation. Each
//! segment is searched for email, phone number and payment card patterns,
//! so free text such as `call 555-123-4567` is caught too. Card candidates
//! must also pass the Luhn checksum.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};

const EMAIL: &str = r"[\w.+-]+@[\w-]+(\.[\w-]+)+";
const PHONE: &str =
    r"(?:^|[^\d+])(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)\s?|\d{3}[-.\s])\d{3}[-.\s]\d{4}(?:$|\D)";
const PHONE_E164: &str = r"(?:^|\D)\+\d{10,14}(?:$|\D)";
const CARD: &str = r"(?:^|\D)((?:\d{4}[- ]?){3}\d{4}|3[47]\d{13})(?:$|\D)";

const SEPARATORS: &[char] = &['/', '?', '&', '=', ',', '"', '{', '}', '[', ']', ':'];

struct Patterns {
    contact: RegexSet,
    card: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            contact: RegexSet::new([EMAIL, PHONE, PHONE_E164])?,
            card: Regex::new(CARD)?,
        })
    }

    fn matches(&self, segment: &str) -> bool {
        self.contact.is_match(segment)
            || self
                .card
                .captures_iter(segment)
                .filter_map(|captures| captures.get(1))
                .any(|candidate| luhn_valid(candidate.as_str()))
    }
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns::compile().ok()).as_ref()
}

/// Returns `true` if `text` carries something that looks like an email
/// address, a phone number or a payment card number.
pub(crate) fn contains_pii(text: &str) -> bool {
    let Some(patterns) = patterns() else {
        return false;
    };
    let decoded = urlencoding::decode(text).map_or_else(|_| text.to_string(), |d| d.into_owned());

    decoded
        .split(SEPARATORS)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .any(|segment| patterns.matches(segment))
}

fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(index, &digit)| {
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}
