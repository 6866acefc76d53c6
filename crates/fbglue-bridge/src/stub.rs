// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub SDK for desktop/CI builds where the Android runtime is unavailable.
//
// Every method returns `PlatformUnavailable` — the real binding lives in the
// `android` module.

use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::RequestDialog;

use crate::traits::FacebookSdk;

/// No-op SDK returned on non-Android platforms.
pub struct StubFacebookSdk;

impl FacebookSdk for StubFacebookSdk {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn is_active(&self) -> Result<bool> {
        Err(FacebookError::PlatformUnavailable)
    }

    fn open_session_with_read_permissions(&self, _permissions: &str) -> Result<bool> {
        tracing::warn!("open_session_with_read_permissions called on stub SDK");
        Err(FacebookError::PlatformUnavailable)
    }

    fn request_new_publish_permissions(&self, _permissions: &str) -> Result<bool> {
        tracing::warn!("request_new_publish_permissions called on stub SDK");
        Err(FacebookError::PlatformUnavailable)
    }

    fn show_frictionless_request_dialog(&self, _dialog: &RequestDialog) -> Result<()> {
        tracing::warn!("show_frictionless_request_dialog called on stub SDK");
        Err(FacebookError::PlatformUnavailable)
    }

    fn access_token(&self) -> Result<String> {
        Err(FacebookError::PlatformUnavailable)
    }

    fn close_and_clear_token_information(&self) -> Result<()> {
        Err(FacebookError::PlatformUnavailable)
    }

    fn expiration_date(&self, _format: &str) -> Result<String> {
        Err(FacebookError::PlatformUnavailable)
    }

    fn is_permission_granted(&self, _permission: &str) -> Result<bool> {
        Err(FacebookError::PlatformUnavailable)
    }
}
