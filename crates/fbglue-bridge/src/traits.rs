// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic capability interface over the Facebook SDK wrapper.

use std::sync::Arc;

use fbglue_core::error::Result;
use fbglue_core::types::RequestDialog;

/// The SDK surface the adapter forwards to.
///
/// Every method is a single synchronous call into the host runtime. An `Err`
/// means the call itself failed (binding error, Java exception); a `false`
/// is the SDK's own answer.
pub trait FacebookSdk: Send + Sync {
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;

    /// Whether the SDK currently holds an open session.
    fn is_active(&self) -> Result<bool>;

    /// Start login with the given comma-separated read permissions.
    fn open_session_with_read_permissions(&self, permissions: &str) -> Result<bool>;

    /// Ask for additional publish permissions on the open session.
    fn request_new_publish_permissions(&self, permissions: &str) -> Result<bool>;

    /// Present the request dialog. The outcome arrives later as a
    /// `Notification::FrictionlessRequest`.
    fn show_frictionless_request_dialog(&self, dialog: &RequestDialog) -> Result<()>;

    /// Current access token, or an empty string without a session.
    fn access_token(&self) -> Result<String>;

    /// Close the session and wipe the cached token.
    fn close_and_clear_token_information(&self) -> Result<()>;

    /// Token expiry rendered with a `java.text.SimpleDateFormat` pattern.
    fn expiration_date(&self, format: &str) -> Result<String>;

    /// Whether `permission` is granted on the current session.
    fn is_permission_granted(&self, permission: &str) -> Result<bool>;
}

// Smart-pointer forwarding, so the adapter can own a platform-selected
// `Box<dyn FacebookSdk>` and tests can keep an `Arc` to their double.
macro_rules! forward_sdk {
    ($($ptr:ident),*) => {$(
        impl<T: FacebookSdk + ?Sized> FacebookSdk for $ptr<T> {
            fn platform_name(&self) -> &str {
                (**self).platform_name()
            }

            fn is_active(&self) -> Result<bool> {
                (**self).is_active()
            }

            fn open_session_with_read_permissions(&self, permissions: &str) -> Result<bool> {
                (**self).open_session_with_read_permissions(permissions)
            }

            fn request_new_publish_permissions(&self, permissions: &str) -> Result<bool> {
                (**self).request_new_publish_permissions(permissions)
            }

            fn show_frictionless_request_dialog(&self, dialog: &RequestDialog) -> Result<()> {
                (**self).show_frictionless_request_dialog(dialog)
            }

            fn access_token(&self) -> Result<String> {
                (**self).access_token()
            }

            fn close_and_clear_token_information(&self) -> Result<()> {
                (**self).close_and_clear_token_information()
            }

            fn expiration_date(&self, format: &str) -> Result<String> {
                (**self).expiration_date(format)
            }

            fn is_permission_granted(&self, permission: &str) -> Result<bool> {
                (**self).is_permission_granted(permission)
            }
        }
    )*};
}

forward_sdk!(Box, Arc);
