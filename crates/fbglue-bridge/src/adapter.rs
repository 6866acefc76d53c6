// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The Facebook bridge adapter: forwards engine calls to the SDK and relays
// queued notifications into the engine's callbacks.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use fbglue_core::config::BridgeConfig;
use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::{Notification, OverflowPolicy, RequestDialog, SessionStatus, clamp_result};

use crate::methods::SdkMethod;
use crate::notify::NotificationReceiver;
use crate::traits::FacebookSdk;

/// `java.text.SimpleDateFormat` pattern requested by [`FacebookAdapter::expiration_date_utc`].
pub const ISO_8601_JAVA_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ssZ";

/// The same layout in `chrono` syntax.
const ISO_8601_CHRONO_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%z";

pub type SessionStatusCallback = Box<dyn FnMut(&SessionStatus) + Send>;
pub type FrictionlessRequestCallback = Box<dyn FnMut(bool) + Send>;

/// The engine's pair of notification handlers. Either may be absent.
#[derive(Default)]
pub struct Callbacks {
    session_status: Option<SessionStatusCallback>,
    frictionless_request: Option<FrictionlessRequestCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_session_status(mut self, callback: impl FnMut(&SessionStatus) + Send + 'static) -> Self {
        self.session_status = Some(Box::new(callback));
        self
    }

    pub fn on_frictionless_request(mut self, callback: impl FnMut(bool) + Send + 'static) -> Self {
        self.frictionless_request = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("session_status", &self.session_status.is_some())
            .field("frictionless_request", &self.frictionless_request.is_some())
            .finish()
    }
}

/// Bridge context: one SDK binding, one callback pair, one notification queue.
///
/// Calls run synchronously on the caller's thread. Notifications are only
/// dispatched from [`dispatch_pending`](Self::dispatch_pending) or
/// [`dispatch_next`](Self::dispatch_next), so callbacks run on whichever
/// thread drives dispatch, never on a host-runtime thread.
///
/// Callbacks may call back into the SDK operations. They must not call
/// [`reinitialize`](Self::reinitialize) on the same adapter.
pub struct FacebookAdapter<S> {
    sdk: S,
    callbacks: Mutex<Callbacks>,
    receiver: tokio::sync::Mutex<NotificationReceiver>,
    max_result_bytes: usize,
    overflow: OverflowPolicy,
}

impl<S: FacebookSdk> FacebookAdapter<S> {
    /// Bind the adapter to an SDK and register the engine callbacks.
    pub fn initialize(
        sdk: S,
        callbacks: Callbacks,
        receiver: NotificationReceiver,
        config: &BridgeConfig,
    ) -> Self {
        info!(platform = sdk.platform_name(), ?callbacks, "Initializing Facebook bridge");
        Self {
            sdk,
            callbacks: Mutex::new(callbacks),
            receiver: tokio::sync::Mutex::new(receiver),
            max_result_bytes: config.max_result_bytes,
            overflow: config.overflow,
        }
    }

    /// Replace both callbacks at once. Every notification dispatched after
    /// this returns sees only the new pair. Returns the previous pair.
    pub fn reinitialize(&self, callbacks: Callbacks) -> Callbacks {
        info!(?callbacks, "Re-registering Facebook callbacks");
        std::mem::replace(&mut *self.lock_callbacks(), callbacks)
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// Result length limit and how it is enforced.
    pub fn result_limit(&self) -> (usize, OverflowPolicy) {
        (self.max_result_bytes, self.overflow)
    }

    #[instrument(skip(self))]
    pub fn is_active(&self) -> Result<bool> {
        self.sdk.is_active()
    }

    #[instrument(skip(self))]
    pub fn open_session_with_read_permissions(&self, permissions: &str) -> Result<bool> {
        let opened = self.sdk.open_session_with_read_permissions(permissions)?;
        debug!(opened, "openSessionWithReadPermissions returned");
        Ok(opened)
    }

    #[instrument(skip(self))]
    pub fn request_new_publish_permissions(&self, permissions: &str) -> Result<bool> {
        let requested = self.sdk.request_new_publish_permissions(permissions)?;
        debug!(requested, "requestNewPublishPermissions returned");
        Ok(requested)
    }

    #[instrument(skip(self, dialog), fields(title = %dialog.title))]
    pub fn show_frictionless_request_dialog(&self, dialog: &RequestDialog) -> Result<()> {
        self.sdk.show_frictionless_request_dialog(dialog)
    }

    /// Current access token, owned by the caller.
    pub fn access_token(&self) -> Result<String> {
        let token = self.sdk.access_token()?;
        self.clamp(token, SdkMethod::GetAccessToken)
    }

    #[instrument(skip(self))]
    pub fn close_and_clear_token_information(&self) -> Result<()> {
        self.sdk.close_and_clear_token_information()
    }

    /// Token expiry formatted with a `SimpleDateFormat` pattern.
    #[instrument(skip(self))]
    pub fn expiration_date(&self, format: &str) -> Result<String> {
        let date = self.sdk.expiration_date(format)?;
        self.clamp(date, SdkMethod::GetExpirationDate)
    }

    /// Token expiry as a UTC timestamp. `None` when there is no session.
    pub fn expiration_date_utc(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.expiration_date(ISO_8601_JAVA_PATTERN)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_str(raw.trim(), ISO_8601_CHRONO_PATTERN)
            .map(|date| Some(date.with_timezone(&Utc)))
            .map_err(|e| FacebookError::Bridge(format!("unparseable expiration date {raw:?}: {e}")))
    }

    #[instrument(skip(self))]
    pub fn is_permission_granted(&self, permission: &str) -> Result<bool> {
        self.sdk.is_permission_granted(permission)
    }

    /// Run all queued notifications through the callbacks. Returns how many
    /// were taken off the queue; a nested call from inside a callback
    /// returns 0.
    pub fn dispatch_pending(&self) -> usize {
        let Ok(mut receiver) = self.receiver.try_lock() else {
            debug!("dispatch already in progress");
            return 0;
        };
        let mut count = 0;
        while let Some(notification) = receiver.try_next() {
            self.dispatch(notification);
            count += 1;
        }
        count
    }

    /// Wait for one notification and dispatch it. Returns `false` once no
    /// sender is left.
    pub async fn dispatch_next(&self) -> bool {
        // Held through `dispatch` so a nested `dispatch_pending` sees a busy
        // receiver instead of re-entering the callbacks.
        let mut receiver = self.receiver.lock().await;
        match receiver.next().await {
            Some(notification) => {
                self.dispatch(notification);
                true
            }
            None => false,
        }
    }

    fn dispatch(&self, notification: Notification) {
        let mut callbacks = self.lock_callbacks();
        match notification {
            Notification::SessionStatus(status) => match callbacks.session_status.as_mut() {
                Some(callback) => callback(&status),
                None => debug!(state = status.state, "no session status callback, dropping"),
            },
            Notification::FrictionlessRequest { success } => {
                match callbacks.frictionless_request.as_mut() {
                    Some(callback) => callback(success),
                    None => debug!(success, "no frictionless request callback, dropping"),
                }
            }
        }
    }

    fn lock_callbacks(&self) -> std::sync::MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clamp(&self, value: String, method: SdkMethod) -> Result<String> {
        clamp_result(value, self.max_result_bytes, self.overflow, method.name())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, OnceLock, Weak};

    use chrono::TimeZone;

    use super::*;
    use crate::notify::notification_channel;
    use crate::recording::RecordingSdk;

    type Log = Arc<Mutex<Vec<String>>>;

    fn adapter_with(callbacks: Callbacks) -> FacebookAdapter<RecordingSdk> {
        adapter_with_config(callbacks, &BridgeConfig::default())
    }

    fn adapter_with_config(callbacks: Callbacks, config: &BridgeConfig) -> FacebookAdapter<RecordingSdk> {
        let (tx, rx) = notification_channel();
        let sdk = RecordingSdk::new().with_notifier(tx);
        FacebookAdapter::initialize(sdk, callbacks, rx, config)
    }

    /// Callbacks that append a tagged line per notification to `log`.
    fn logging_callbacks(tag: &'static str, log: &Log) -> Callbacks {
        let session_log = Arc::clone(log);
        let request_log = Arc::clone(log);
        Callbacks::new()
            .on_session_status(move |s| {
                session_log
                    .lock()
                    .unwrap()
                    .push(format!("{tag}:session:{}:{}:{}", s.state, s.permissions, s.error_code));
            })
            .on_frictionless_request(move |ok| {
                request_log.lock().unwrap().push(format!("{tag}:request:{ok}"));
            })
    }

    /// Permission strings the SDK must receive byte for byte.
    fn permission_cases() -> Vec<String> {
        vec![
            String::new(),
            "é,ü".into(),
            "public_profile, email ,, user_friends ".into(),
            " \t email\n".into(),
            "user_likes,".repeat(200),
        ]
    }

    #[test]
    fn open_session_forwards_permissions_once_and_releases() {
        for permissions in permission_cases() {
            let adapter = adapter_with(Callbacks::new());

            adapter
                .open_session_with_read_permissions(&permissions)
                .expect("open");

            let calls = adapter.sdk().calls_to(SdkMethod::OpenSessionWithReadPermissions);
            assert_eq!(calls.len(), 1, "case {permissions:?}");
            assert_eq!(calls[0].args, vec![permissions.clone()]);
            assert_eq!(adapter.sdk().marshaled_strings(), 1);
            assert_eq!(adapter.sdk().released_strings(), 1);
        }
    }

    #[test]
    fn failed_open_session_forwards_and_releases_every_case() {
        for permissions in permission_cases() {
            let adapter = adapter_with(Callbacks::new());
            adapter.sdk().fail(SdkMethod::OpenSessionWithReadPermissions);

            assert!(adapter.open_session_with_read_permissions(&permissions).is_err());

            let calls = adapter.sdk().calls_to(SdkMethod::OpenSessionWithReadPermissions);
            assert_eq!(calls.len(), 1, "case {permissions:?}");
            assert_eq!(calls[0].args, vec![permissions.clone()]);
            assert_eq!(adapter.sdk().marshaled_strings(), 1);
            assert_eq!(adapter.sdk().released_strings(), 1);
        }
    }

    #[test]
    fn long_permission_string_is_not_clamped() {
        let permissions = "x".repeat(4096);
        let adapter = adapter_with(Callbacks::new());
        adapter
            .open_session_with_read_permissions(&permissions)
            .expect("open");
        let calls = adapter.sdk().calls_to(SdkMethod::OpenSessionWithReadPermissions);
        assert_eq!(calls[0].args[0].len(), 4096);
    }

    #[test]
    fn open_session_failure_still_releases_argument() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().fail(SdkMethod::OpenSessionWithReadPermissions);

        let err = adapter
            .open_session_with_read_permissions("email")
            .expect_err("injected failure");
        assert!(matches!(err, FacebookError::JavaException { .. }));
        assert_eq!(adapter.sdk().marshaled_strings(), 1);
        assert_eq!(adapter.sdk().released_strings(), 1);
    }

    #[test]
    fn denied_login_is_false_not_error() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_open_result(false);
        assert!(!adapter.open_session_with_read_permissions("email").expect("open"));
    }

    #[test]
    fn dialog_releases_all_three_strings_even_on_failure() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().fail(SdkMethod::ShowFrictionlessRequestDialog);
        let dialog = RequestDialog {
            recipients: "1001,1002".into(),
            title: "Join me".into(),
            message: "Come play".into(),
        };

        assert!(adapter.show_frictionless_request_dialog(&dialog).is_err());

        let calls = adapter.sdk().calls_to(SdkMethod::ShowFrictionlessRequestDialog);
        assert_eq!(calls[0].args, vec!["1001,1002", "Join me", "Come play"]);
        assert_eq!(adapter.sdk().marshaled_strings(), 3);
        assert_eq!(adapter.sdk().released_strings(), 3);
    }

    #[test]
    fn publish_permissions_use_their_own_method() {
        let adapter = adapter_with(Callbacks::new());
        assert!(adapter.request_new_publish_permissions("publish_actions").expect("publish"));
        assert!(adapter.is_permission_granted("publish_actions").expect("granted"));
        assert!(adapter.sdk().calls_to(SdkMethod::OpenSessionWithReadPermissions).is_empty());
    }

    #[test]
    fn denied_publish_request_grants_nothing() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_publish_result(false);

        assert!(!adapter.request_new_publish_permissions("publish_actions").expect("publish"));
        assert!(!adapter.is_permission_granted("publish_actions").expect("granted"));
        assert_eq!(
            adapter.sdk().calls_to(SdkMethod::RequestNewPublishPermissions)[0].args,
            vec!["publish_actions"]
        );
    }

    #[test]
    fn access_token_truncates_to_limit() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_access_token("t".repeat(4096));

        let token = adapter.access_token().expect("token");
        assert_eq!(token.len(), 1023);
    }

    #[test]
    fn access_token_reject_policy_errors() {
        let config = BridgeConfig {
            overflow: OverflowPolicy::Reject,
            ..BridgeConfig::default()
        };
        let adapter = adapter_with_config(Callbacks::new(), &config);
        adapter.sdk().set_access_token("t".repeat(1024));

        assert!(matches!(
            adapter.access_token(),
            Err(FacebookError::ResultTooLong { len: 1024, max: 1023, .. })
        ));
    }

    #[test]
    fn token_results_are_independent_owned_values() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_access_token("first");
        let first = adapter.access_token().expect("token");
        adapter.sdk().set_access_token("second");
        let second = adapter.access_token().expect("token");

        assert_eq!(first, "first");
        assert_eq!(second, "second");
    }

    #[test]
    fn expiration_date_forwards_format() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_expiration_date("2026-12-01");

        assert_eq!(adapter.expiration_date("yyyy-MM-dd").expect("date"), "2026-12-01");
        let calls = adapter.sdk().calls_to(SdkMethod::GetExpirationDate);
        assert_eq!(calls[0].args, vec!["yyyy-MM-dd"]);
        assert_eq!(adapter.sdk().released_strings(), 1);
    }

    #[test]
    fn expiration_date_utc_parses_iso_output() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().set_expiration_date("2026-12-01T10:30:00+0200");

        let expiry = adapter.expiration_date_utc().expect("parse");
        assert_eq!(expiry, Some(Utc.with_ymd_and_hms(2026, 12, 1, 8, 30, 0).unwrap()));
        let calls = adapter.sdk().calls_to(SdkMethod::GetExpirationDate);
        assert_eq!(calls[0].args, vec![ISO_8601_JAVA_PATTERN]);
    }

    #[test]
    fn expiration_date_utc_without_session_is_none() {
        let adapter = adapter_with(Callbacks::new());
        assert_eq!(adapter.expiration_date_utc().expect("parse"), None);
    }

    #[test]
    fn close_forwards_without_arguments() {
        let adapter = adapter_with(Callbacks::new());
        adapter.close_and_clear_token_information().expect("close");
        let calls = adapter.sdk().calls_to(SdkMethod::CloseAndClearTokenInformation);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.is_empty());
    }

    #[test]
    fn session_notification_reaches_callback_losslessly() {
        let log = Log::default();
        let adapter = adapter_with(logging_callbacks("a", &log));

        adapter
            .sdk()
            .emit_session_status(1, "public_profile", 0)
            .expect("emit");
        assert_eq!(adapter.dispatch_pending(), 1);

        assert_eq!(*log.lock().unwrap(), vec!["a:session:1:public_profile:0"]);
    }

    #[test]
    fn notification_without_callback_is_dropped() {
        let adapter = adapter_with(Callbacks::new());
        adapter.sdk().emit_frictionless_request(true).expect("emit");
        adapter.sdk().emit_session_status(2, "", 7).expect("emit");

        assert_eq!(adapter.dispatch_pending(), 2);
        assert_eq!(adapter.dispatch_pending(), 0);
    }

    #[test]
    fn dialog_result_arrives_as_notification() {
        let log = Log::default();
        let adapter = adapter_with(logging_callbacks("a", &log));
        adapter.sdk().set_dialog_success(false);

        let dialog = RequestDialog {
            recipients: String::new(),
            title: "t".into(),
            message: "m".into(),
        };
        adapter.show_frictionless_request_dialog(&dialog).expect("show");
        assert!(log.lock().unwrap().is_empty());

        adapter.dispatch_pending();
        assert_eq!(*log.lock().unwrap(), vec!["a:request:false"]);
    }

    #[test]
    fn reinitialize_swaps_both_callbacks_together() {
        let log = Log::default();
        let adapter = adapter_with(logging_callbacks("old", &log));

        adapter.sdk().emit_frictionless_request(true).expect("emit");
        adapter.dispatch_pending();

        // Queued before the swap, dispatched after it.
        adapter.sdk().emit_session_status(1, "email", 0).expect("emit");
        adapter.sdk().emit_frictionless_request(false).expect("emit");
        let previous = adapter.reinitialize(logging_callbacks("new", &log));
        adapter.dispatch_pending();

        assert!(format!("{previous:?}").contains("session_status: true"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["old:request:true", "new:session:1:email:0", "new:request:false"]
        );
    }

    #[tokio::test]
    async fn nested_dispatch_inside_dispatch_next_returns_zero() {
        type Slot = Arc<OnceLock<Weak<FacebookAdapter<RecordingSdk>>>>;
        let slot = Slot::default();
        let nested = Arc::new(Mutex::new(Vec::new()));

        let callback_slot = Arc::clone(&slot);
        let callback_nested = Arc::clone(&nested);
        let callbacks = Callbacks::new().on_frictionless_request(move |_| {
            if let Some(adapter) = callback_slot.get().and_then(Weak::upgrade) {
                callback_nested.lock().unwrap().push(adapter.dispatch_pending());
            }
        });

        let (tx, rx) = notification_channel();
        let adapter = Arc::new(FacebookAdapter::initialize(
            RecordingSdk::new().with_notifier(tx),
            callbacks,
            rx,
            &BridgeConfig::default(),
        ));
        slot.set(Arc::downgrade(&adapter)).expect("slot set once");

        adapter.sdk().emit_frictionless_request(true).expect("emit");
        adapter.sdk().emit_frictionless_request(false).expect("emit");

        assert!(adapter.dispatch_next().await);
        assert!(adapter.dispatch_next().await);
        assert_eq!(*nested.lock().unwrap(), vec![0, 0]);
    }

    #[tokio::test]
    async fn dispatch_next_stops_when_senders_are_gone() {
        let log = Log::default();
        let (tx, rx) = notification_channel();
        let adapter = FacebookAdapter::initialize(
            RecordingSdk::new(),
            logging_callbacks("a", &log),
            rx,
            &BridgeConfig::default(),
        );

        let host = std::thread::spawn(move || {
            tx.session_status(1, "email".into(), 0).expect("send");
        });
        host.join().expect("join");

        assert!(adapter.dispatch_next().await);
        assert!(!adapter.dispatch_next().await);
        assert_eq!(*log.lock().unwrap(), vec!["a:session:1:email:0"]);
    }
}
