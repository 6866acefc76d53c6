// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scriptable in-process SDK that records every call.
//
// Stands in for the Java wrapper in tests and headless tools. String
// arguments are "marshaled" into guards that count their own release, which
// mirrors the local-reference discipline of the JNI binding.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::{PermissionSet, RequestDialog};

use crate::methods::SdkMethod;
use crate::notify::NotificationSender;
use crate::traits::FacebookSdk;

/// One observed call into the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkCall {
    pub method: SdkMethod,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
struct Script {
    active: bool,
    open_result: bool,
    publish_result: bool,
    dialog_success: bool,
    access_token: String,
    expiration_date: String,
    granted: PermissionSet,
    failures: HashSet<SdkMethod>,
}

/// Test double for [`FacebookSdk`].
#[derive(Debug, Default)]
pub struct RecordingSdk {
    calls: Mutex<Vec<SdkCall>>,
    script: Mutex<Script>,
    marshaled: AtomicUsize,
    released: AtomicUsize,
    notifier: Option<NotificationSender>,
}

/// A marshaled string argument; counts its release on drop.
struct LocalString<'a> {
    value: String,
    released: &'a AtomicUsize,
}

impl Drop for LocalString<'_> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordingSdk {
    /// Login and publish requests succeed, the dialog reports success.
    pub fn new() -> Self {
        let sdk = Self::default();
        {
            let mut script = sdk.script();
            script.open_result = true;
            script.publish_result = true;
            script.dialog_success = true;
        }
        sdk
    }

    /// Route synthesized notifications to `sender`.
    pub fn with_notifier(mut self, sender: NotificationSender) -> Self {
        self.notifier = Some(sender);
        self
    }

    pub fn set_active(&self, active: bool) {
        self.script().active = active;
    }

    pub fn set_open_result(&self, result: bool) {
        self.script().open_result = result;
    }

    pub fn set_publish_result(&self, result: bool) {
        self.script().publish_result = result;
    }

    pub fn set_dialog_success(&self, success: bool) {
        self.script().dialog_success = success;
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.script().access_token = token.into();
    }

    pub fn set_expiration_date(&self, date: impl Into<String>) {
        self.script().expiration_date = date.into();
    }

    pub fn grant(&self, permissions: &str) {
        let added = PermissionSet::parse(permissions);
        let mut script = self.script();
        let merged: PermissionSet = script.granted.iter().chain(added.iter()).collect();
        script.granted = merged;
    }

    /// Make every later call to `method` fail as if the wrapper threw.
    pub fn fail(&self, method: SdkMethod) {
        self.script().failures.insert(method);
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls_to(&self, method: SdkMethod) -> Vec<SdkCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    /// Strings converted for the runtime so far.
    pub fn marshaled_strings(&self) -> usize {
        self.marshaled.load(Ordering::SeqCst)
    }

    /// Strings released so far.
    pub fn released_strings(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Deliver a session status notification as the host runtime would.
    pub fn emit_session_status(&self, state: i32, permissions: &str, error_code: i32) -> Result<()> {
        self.notifier()?
            .session_status(state, permissions.to_owned(), error_code)
    }

    /// Deliver a frictionless request result as the host runtime would.
    pub fn emit_frictionless_request(&self, success: bool) -> Result<()> {
        self.notifier()?.frictionless_request(success)
    }

    fn notifier(&self) -> Result<&NotificationSender> {
        self.notifier
            .as_ref()
            .ok_or_else(|| FacebookError::Bridge("recording SDK has no notifier".into()))
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn marshal(&self, value: &str) -> LocalString<'_> {
        self.marshaled.fetch_add(1, Ordering::SeqCst);
        LocalString {
            value: value.to_owned(),
            released: &self.released,
        }
    }

    /// Record the call, then fail if scripted to. Arguments are released on
    /// both paths.
    fn invoke(&self, method: SdkMethod, args: &[&str]) -> Result<()> {
        debug_assert_eq!(args.len(), method.string_args(), "{method} arity");
        let locals: Vec<LocalString<'_>> = args.iter().map(|a| self.marshal(a)).collect();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SdkCall {
                method,
                args: locals.iter().map(|l| l.value.clone()).collect(),
            });

        if self.script().failures.contains(&method) {
            return Err(FacebookError::JavaException {
                method: method.name(),
                detail: "injected failure".into(),
            });
        }
        Ok(())
    }
}

impl FacebookSdk for RecordingSdk {
    fn platform_name(&self) -> &str {
        "Recording"
    }

    fn is_active(&self) -> Result<bool> {
        self.invoke(SdkMethod::IsActive, &[])?;
        Ok(self.script().active)
    }

    fn open_session_with_read_permissions(&self, permissions: &str) -> Result<bool> {
        self.invoke(SdkMethod::OpenSessionWithReadPermissions, &[permissions])?;
        let opened = self.script().open_result;
        if opened {
            self.set_active(true);
            self.grant(permissions);
        }
        Ok(opened)
    }

    fn request_new_publish_permissions(&self, permissions: &str) -> Result<bool> {
        self.invoke(SdkMethod::RequestNewPublishPermissions, &[permissions])?;
        let granted = self.script().publish_result;
        if granted {
            self.grant(permissions);
        }
        Ok(granted)
    }

    fn show_frictionless_request_dialog(&self, dialog: &RequestDialog) -> Result<()> {
        self.invoke(
            SdkMethod::ShowFrictionlessRequestDialog,
            &[dialog.recipients.as_str(), dialog.title.as_str(), dialog.message.as_str()],
        )?;
        if let Some(notifier) = &self.notifier {
            let success = self.script().dialog_success;
            notifier.frictionless_request(success)?;
        }
        Ok(())
    }

    fn access_token(&self) -> Result<String> {
        self.invoke(SdkMethod::GetAccessToken, &[])?;
        Ok(self.script().access_token.clone())
    }

    fn close_and_clear_token_information(&self) -> Result<()> {
        self.invoke(SdkMethod::CloseAndClearTokenInformation, &[])?;
        let mut script = self.script();
        script.active = false;
        script.access_token.clear();
        script.expiration_date.clear();
        script.granted = PermissionSet::default();
        Ok(())
    }

    fn expiration_date(&self, format: &str) -> Result<String> {
        self.invoke(SdkMethod::GetExpirationDate, &[format])?;
        Ok(self.script().expiration_date.clone())
    }

    fn is_permission_granted(&self, permission: &str) -> Result<bool> {
        self.invoke(SdkMethod::IsPermissionGranted, &[permission])?;
        Ok(self.script().granted.contains(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_arguments_verbatim() {
        let sdk = RecordingSdk::new();
        sdk.open_session_with_read_permissions("email,user_likes")
            .expect("open");

        assert_eq!(
            sdk.calls(),
            vec![SdkCall {
                method: SdkMethod::OpenSessionWithReadPermissions,
                args: vec!["email,user_likes".into()],
            }]
        );
    }

    #[test]
    fn injected_failure_still_releases_arguments() {
        let sdk = RecordingSdk::new();
        sdk.fail(SdkMethod::IsPermissionGranted);

        assert!(sdk.is_permission_granted("email").is_err());
        assert_eq!(sdk.marshaled_strings(), 1);
        assert_eq!(sdk.released_strings(), 1);
    }

    #[test]
    fn close_clears_session_state() {
        let sdk = RecordingSdk::new();
        sdk.open_session_with_read_permissions("email").expect("open");
        sdk.set_access_token("EAAB");

        sdk.close_and_clear_token_information().expect("close");

        assert!(!sdk.is_active().expect("is_active"));
        assert_eq!(sdk.access_token().expect("token"), "");
        assert!(!sdk.is_permission_granted("email").expect("granted"));
    }

    #[test]
    fn emit_without_notifier_is_an_error() {
        let sdk = RecordingSdk::new();
        assert!(sdk.emit_frictionless_request(true).is_err());
    }
}
