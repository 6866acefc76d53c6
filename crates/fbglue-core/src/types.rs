// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Facebook session bridge.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FacebookError, Result};

/// Payload of a session status notification from the SDK wrapper.
///
/// `state` and `error_code` are forwarded untouched; their meaning is owned
/// by the Java side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: i32,
    /// Granted permissions in wire form (comma-separated).
    pub permissions: String,
    pub error_code: i32,
}

impl SessionStatus {
    /// Granted permissions, parsed.
    pub fn granted(&self) -> PermissionSet {
        PermissionSet::parse(&self.permissions)
    }
}

/// Ordered, de-duplicated set of permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(Vec<String>);

impl PermissionSet {
    /// Parse the comma-separated wire form, e.g. `"email, user_likes"`.
    pub fn parse(wire: &str) -> Self {
        wire.split(',').collect()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.iter().any(|p| p == permission)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in iter {
            let name = name.as_ref().trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }
        Self(names)
    }
}

impl std::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Arguments for the frictionless request dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDialog {
    /// Comma-separated recipient ids; empty lets the user pick.
    pub recipients: String,
    pub title: String,
    pub message: String,
}

/// Asynchronous event raised by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    SessionStatus(SessionStatus),
    FrictionlessRequest { success: bool },
}

/// What to do with a string result longer than the configured limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Cut at the limit (on a UTF-8 boundary) and log a warning.
    #[default]
    Truncate,
    /// Fail with `FacebookError::ResultTooLong`.
    Reject,
}

/// Apply the overflow policy to a string result.
pub fn clamp_result(
    value: String,
    max_bytes: usize,
    policy: OverflowPolicy,
    operation: &'static str,
) -> Result<String> {
    if value.len() <= max_bytes {
        return Ok(value);
    }

    match policy {
        OverflowPolicy::Reject => Err(FacebookError::ResultTooLong {
            operation,
            len: value.len(),
            max: max_bytes,
        }),
        OverflowPolicy::Truncate => {
            let mut cut = max_bytes;
            while !value.is_char_boundary(cut) {
                cut -= 1;
            }
            warn!(operation, len = value.len(), max = max_bytes, "truncating SDK result");
            let mut value = value;
            value.truncate(cut);
            Ok(value)
        }
    }
}
