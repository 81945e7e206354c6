//! Application identity resolution
//!
//! Maps a namespace record to the logical application it belongs to. An
//! explicit `app_id` always wins; otherwise the id is derived from naming
//! conventions in the namespace name.

use crate::models::{NamespaceRecord, UNKNOWN};
use regex::Regex;
use std::sync::OnceLock;

/// `app-12345`, `app-12345-dev`. Only the start is anchored, so
/// `app-1234567` yields `app-123456`.
static PREFIX_NUMBER: OnceLock<Regex> = OnceLock::new();

/// `acme-app-12345`, `acme-app-12345-prod`
static PREFIX_SEGMENT_NUMBER: OnceLock<Regex> = OnceLock::new();

fn prefix_number() -> &'static Regex {
    PREFIX_NUMBER.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)-([0-9]{4,6})").expect("static regex is valid")
    })
}

fn prefix_segment_number() -> &'static Regex {
    PREFIX_SEGMENT_NUMBER.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)-([A-Za-z]+)-[0-9]{4,6}").expect("static regex is valid")
    })
}

/// Resolve the application id of a record.
///
/// Pure and infallible: anything that cannot be attributed comes back as the
/// `unknown` sentinel.
pub fn resolve(record: &NamespaceRecord) -> String {
    match record.explicit_app_id() {
        Some(explicit) => explicit.to_string(),
        None => resolve_namespace(&record.namespace),
    }
}

/// Derive an application id from a namespace name alone
pub fn resolve_namespace(namespace: &str) -> String {
    for pattern in [prefix_number(), prefix_segment_number()] {
        if let Some(caps) = pattern.captures(namespace) {
            return format!("{}-{}", &caps[1], &caps[2]);
        }
    }

    match namespace.split_once('-') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

pub fn is_unknown(app_id: &str) -> bool {
    app_id == UNKNOWN
}
