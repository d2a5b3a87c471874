//! Address classification
//!
//! Splits a caller-supplied, comma-separated address list and picks at most
//! one IPv4 and one IPv6 candidate. The first element matching a family wins;
//! the two families are selected independently of each other's position.
//!
//! Matching is purely textual. An element that matches neither grammar is
//! skipped, never reported as an error on its own.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::traits::RecordType;

const OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

/// Embedded dotted-quad tail as written inside IPv6 literals
const V4_TAIL: &str =
    r"(?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])";

static IPV4_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:{OCTET}\.){{3}}{OCTET}$")).expect("IPv4 grammar compiles")
});

static IPV6_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    const H: &str = "[0-9a-f]{1,4}";
    let alternatives = [
        format!("(?:{H}:){{7}}{H}"),
        format!("(?:{H}:){{1,7}}:"),
        format!("(?:{H}:){{1,6}}:{H}"),
        format!("(?:{H}:){{1,5}}(?::{H}){{1,2}}"),
        format!("(?:{H}:){{1,4}}(?::{H}){{1,3}}"),
        format!("(?:{H}:){{1,3}}(?::{H}){{1,4}}"),
        format!("(?:{H}:){{1,2}}(?::{H}){{1,5}}"),
        format!("{H}:(?:(?::{H}){{1,6}})"),
        format!(":(?:(?::{H}){{1,7}}|:)"),
        "fe80:(?::[0-9a-f]{0,4}){0,4}%[0-9a-z]+".to_string(),
        format!("::(?:ffff(?::0{{1,4}})?:)?{V4_TAIL}"),
        format!("(?:{H}:){{1,4}}:{V4_TAIL}"),
    ];
    Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|"))).expect("IPv6 grammar compiles")
});

/// Address family of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl AddressFamily {
    /// Record type that carries addresses of this family
    pub fn record_type(&self) -> RecordType {
        match self {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::Aaaa,
        }
    }

    /// Determine the family of `s`, if it matches either grammar
    pub fn of(s: &str) -> Option<Self> {
        if is_ipv4(s) {
            Some(AddressFamily::V4)
        } else if is_ipv6(s) {
            Some(AddressFamily::V6)
        } else {
            None
        }
    }
}

/// A list element confirmed to match one of the address grammars
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressCandidate {
    family: AddressFamily,
    value: String,
}

impl AddressCandidate {
    /// Accept `value` if it matches either grammar
    pub fn parse(value: &str) -> Option<Self> {
        AddressFamily::of(value).map(|family| Self {
            family,
            value: value.to_string(),
        })
    }

    /// The candidate's family
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The address exactly as supplied by the caller
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for AddressCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Result of classifying an address list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedAddresses {
    /// First IPv4 match, if any
    pub v4: Option<AddressCandidate>,
    /// First IPv6 match, if any
    pub v6: Option<AddressCandidate>,
}

impl ClassifiedAddresses {
    /// Candidate for the family carried by `record_type`
    pub fn for_record_type(&self, record_type: RecordType) -> Option<&AddressCandidate> {
        match record_type {
            RecordType::A => self.v4.as_ref(),
            RecordType::Aaaa => self.v6.as_ref(),
        }
    }

    /// True when neither family has a candidate
    pub fn is_empty(&self) -> bool {
        self.v4.is_none() && self.v6.is_none()
    }
}

/// Test `s` against the IPv4 dotted-quad grammar
pub fn is_ipv4(s: &str) -> bool {
    IPV4_GRAMMAR.is_match(s)
}

/// Test `s` against the IPv6 hextet grammar
pub fn is_ipv6(s: &str) -> bool {
    IPV6_GRAMMAR.is_match(s)
}

/// Classify a comma-separated address list
///
/// # Errors
///
/// Returns [`Error::NoValidAddress`] when no element matches either grammar.
pub fn classify(raw_list: &str) -> Result<ClassifiedAddresses> {
    let mut classified = ClassifiedAddresses::default();

    for element in raw_list.split(',') {
        match AddressFamily::of(element) {
            Some(AddressFamily::V4) if classified.v4.is_none() => {
                classified.v4 = AddressCandidate::parse(element);
            }
            Some(AddressFamily::V6) if classified.v6.is_none() => {
                classified.v6 = AddressCandidate::parse(element);
            }
            _ => {}
        }

        if classified.v4.is_some() && classified.v6.is_some() {
            break;
        }
    }

    if classified.is_empty() {
        return Err(Error::no_valid_address(raw_list));
    }

    Ok(classified)
}
