// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::OverflowPolicy;

/// JNI path of the Java wrapper around the Facebook SDK.
pub const DEFAULT_SDK_CLASS: &str = "co/theengine/loomplayer/LoomFacebook";

/// Persistent bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Class whose static methods are bound at initialization.
    pub sdk_class: String,
    /// Longest string result (in bytes) returned to the engine.
    pub max_result_bytes: usize,
    /// Handling of results longer than `max_result_bytes`.
    pub overflow: OverflowPolicy,
    /// `EnvFilter` directive used when the C API installs logging.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sdk_class: DEFAULT_SDK_CLASS.to_owned(),
            max_result_bytes: 1023,
            overflow: OverflowPolicy::Truncate,
            log_filter: "info".to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
