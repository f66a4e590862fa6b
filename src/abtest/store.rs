//! Assignment persistence.
//!
//! The manager reads the store once at construction and writes the complete
//! map back after every new or forced assignment.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// `user id -> experiment id -> variant id`
pub type Assignments = BTreeMap<String, BTreeMap<String, String>>;

pub const COOKIE_NAME: &str = "abtest_assignments";

/// Characters left unescaped by `encodeURIComponent`, so browser-side code
/// can read the cookie with `decodeURIComponent`.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub trait AssignmentStore: Send {
    fn get(&self) -> Assignments;
    fn set_all(&mut self, assignments: &Assignments);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAssignmentStore {
    assignments: Assignments,
    writes: usize,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignments(assignments: Assignments) -> Self {
        Self {
            assignments,
            writes: 0,
        }
    }

    /// Number of `set_all` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn get(&self) -> Assignments {
        self.assignments.clone()
    }

    fn set_all(&mut self, assignments: &Assignments) {
        self.assignments = assignments.clone();
        self.writes += 1;
    }
}

/// Holds the encoded `abtest_assignments` cookie value for one request.
#[derive(Debug, Clone, Default)]
pub struct CookieAssignmentStore {
    value: Option<String>,
}

impl CookieAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the assignment cookie out of a `Cookie` request header.
    ///
    /// A value that does not decode to an assignment map is dropped, so it is
    /// never echoed back in `Set-Cookie`.
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let value = header
            .and_then(|header| {
                header.split(';').find_map(|pair| {
                    let (name, value) = pair.trim().split_once('=')?;
                    (name.trim() == COOKIE_NAME).then(|| value.trim().to_string())
                })
            })
            .filter(|raw| decode_assignments(raw).is_some());
        Self { value }
    }

    /// The encoded cookie value, if any assignments were loaded or written.
    pub fn cookie_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// `Set-Cookie` header persisting the current value.
    pub fn set_cookie_header(&self, max_age_days: u32) -> Option<String> {
        let value = self.value.as_ref()?;
        Some(format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            COOKIE_NAME,
            value,
            u64::from(max_age_days) * 24 * 60 * 60
        ))
    }
}

impl AssignmentStore for CookieAssignmentStore {
    fn get(&self) -> Assignments {
        self.value
            .as_deref()
            .and_then(decode_assignments)
            .unwrap_or_default()
    }

    fn set_all(&mut self, assignments: &Assignments) {
        match serde_json::to_string(assignments) {
            Ok(json) => self.value = Some(utf8_percent_encode(&json, COOKIE_VALUE).to_string()),
            Err(e) => warn!("Failed to serialize assignments: {}", e),
        }
    }
}

/// Decode a percent-encoded JSON assignment map. Unparsable state is
/// treated as no prior assignments.
fn decode_assignments(raw: &str) -> Option<Assignments> {
    let decoded = match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!("Ignoring undecodable assignment cookie: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&decoded) {
        Ok(assignments) => Some(assignments),
        Err(e) => {
            debug!("Ignoring malformed assignment cookie: {}", e);
            None
        }
    }
}
