// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C platform API for the Loom engine.
//
// One process-wide adapter backs these functions. Failures are logged and
// surface as `false` or a null pointer. Returned strings are heap-allocated
// and owned by the caller, who must release them with `fb_string_free`.
// Notifications are only delivered from `fb_dispatch_notifications`, which
// the engine calls from its main loop.

use std::ffi::{CStr, CString, c_char, c_int};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fbglue_core::config::BridgeConfig;
use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::RequestDialog;

use crate::adapter::{Callbacks, FacebookAdapter};
use crate::notify::{NotificationReceiver, notification_channel};
use crate::traits::FacebookSdk;

/// `void (*)(int state, const char* permissions, int errorCode)`.
///
/// `permissions` is only valid for the duration of the call.
pub type SessionStatusCallback =
    extern "C" fn(state: c_int, permissions: *const c_char, error_code: c_int);

/// `void (*)(bool success)`.
pub type FrictionlessRequestCallback = extern "C" fn(success: bool);

type EngineAdapter = FacebookAdapter<Box<dyn FacebookSdk>>;

static ADAPTER: RwLock<Option<Arc<EngineAdapter>>> = RwLock::new(None);

fn current() -> Result<Arc<EngineAdapter>> {
    ADAPTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(FacebookError::NotInitialized)
}

/// Replace the process-wide adapter.
pub(crate) fn install(
    sdk: Box<dyn FacebookSdk>,
    callbacks: Callbacks,
    receiver: NotificationReceiver,
    config: &BridgeConfig,
) {
    let adapter = FacebookAdapter::initialize(sdk, callbacks, receiver, config);
    *ADAPTER.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(adapter));
}

fn engine_callbacks(
    session_status: Option<SessionStatusCallback>,
    frictionless_request: Option<FrictionlessRequestCallback>,
) -> Callbacks {
    let mut callbacks = Callbacks::new();
    if let Some(callback) = session_status {
        callbacks = callbacks.on_session_status(move |status| {
            match CString::new(status.permissions.as_str()) {
                Ok(permissions) => callback(status.state, permissions.as_ptr(), status.error_code),
                Err(_) => warn!(state = status.state, "permissions contain NUL, dropping notification"),
            }
        });
    }
    if let Some(callback) = frictionless_request {
        callbacks = callbacks.on_frictionless_request(move |success| callback(success));
    }
    callbacks
}

fn init_logging(filter: &str) {
    // Another subscriber may already be installed by the host; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
}

fn initialize(
    config_path: Option<&str>,
    session_status: Option<SessionStatusCallback>,
    frictionless_request: Option<FrictionlessRequestCallback>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => BridgeConfig::load(Path::new(path))?,
        None => BridgeConfig::default(),
    };
    init_logging(&config.log_filter);

    let (sender, receiver) = notification_channel();
    let sdk = crate::platform_sdk(&config, sender)?;
    install(
        sdk,
        engine_callbacks(session_status, frictionless_request),
        receiver,
        &config,
    );
    info!("Facebook bridge ready");
    Ok(())
}

/// Borrow a C string argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(FacebookError::InvalidArgument(format!("{name} is null")));
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FacebookError::InvalidArgument(format!("{name} is not UTF-8")))
}

fn report<T>(operation: &str, result: Result<T>, fallback: T) -> T {
    result.unwrap_or_else(|e| {
        error!(operation, error = %e, "Facebook call failed");
        fallback
    })
}

fn into_c_string(operation: &str, value: Result<String>) -> *mut c_char {
    let owned = value.and_then(|value| {
        CString::new(value)
            .map_err(|_| FacebookError::Bridge("result contains an interior NUL".into()))
    });
    match owned {
        Ok(owned) => owned.into_raw(),
        Err(e) => {
            error!(operation, error = %e, "Facebook call failed");
            std::ptr::null_mut()
        }
    }
}

/// Register the engine callbacks and bind the SDK with default settings.
/// Calling it again replaces the binding and both callbacks.
#[unsafe(no_mangle)]
pub extern "C" fn fb_initialize(
    session_status: Option<SessionStatusCallback>,
    frictionless_request: Option<FrictionlessRequestCallback>,
) -> bool {
    let result = initialize(None, session_status, frictionless_request);
    report("initialize", result.map(|()| true), false)
}

/// As [`fb_initialize`], reading settings from a JSON file.
///
/// # Safety
/// `config_path` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_initialize_with_config(
    config_path: *const c_char,
    session_status: Option<SessionStatusCallback>,
    frictionless_request: Option<FrictionlessRequestCallback>,
) -> bool {
    let result = if config_path.is_null() {
        initialize(None, session_status, frictionless_request)
    } else {
        // SAFETY: forwarded from this function's contract.
        unsafe { arg(config_path, "config_path") }
            .and_then(|path| initialize(Some(path), session_status, frictionless_request))
    };
    report("initialize", result.map(|()| true), false)
}

#[unsafe(no_mangle)]
pub extern "C" fn fb_is_active() -> bool {
    report("isActive", current().and_then(|a| a.is_active()), false)
}

/// # Safety
/// `permissions` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_open_session_with_read_permissions(permissions: *const c_char) -> bool {
    // SAFETY: forwarded from this function's contract.
    let result = unsafe { arg(permissions, "permissions") }
        .and_then(|p| current()?.open_session_with_read_permissions(p));
    report("openSessionWithReadPermissions", result, false)
}

/// # Safety
/// `permissions` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_request_new_publish_permissions(permissions: *const c_char) -> bool {
    // SAFETY: forwarded from this function's contract.
    let result = unsafe { arg(permissions, "permissions") }
        .and_then(|p| current()?.request_new_publish_permissions(p));
    report("requestNewPublishPermissions", result, false)
}

/// Returns once the dialog is shown; the outcome arrives through the
/// frictionless request callback.
///
/// # Safety
/// All three arguments must be valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_show_frictionless_request_dialog(
    recipients: *const c_char,
    title: *const c_char,
    message: *const c_char,
) {
    // SAFETY: forwarded from this function's contract.
    let dialog = unsafe {
        arg(recipients, "recipients").and_then(|recipients| {
            Ok(RequestDialog {
                recipients: recipients.to_owned(),
                title: arg(title, "title")?.to_owned(),
                message: arg(message, "message")?.to_owned(),
            })
        })
    };
    let result = dialog.and_then(|d| current()?.show_frictionless_request_dialog(&d));
    report("showFrictionlessRequestDialog", result, ());
}

/// Caller frees the result with [`fb_string_free`]. Null on failure.
#[unsafe(no_mangle)]
pub extern "C" fn fb_get_access_token() -> *mut c_char {
    into_c_string("getAccessToken", current().and_then(|a| a.access_token()))
}

#[unsafe(no_mangle)]
pub extern "C" fn fb_close_and_clear_token_information() {
    let result = current().and_then(|a| a.close_and_clear_token_information());
    report("closeAndClearTokenInformation", result, ());
}

/// Caller frees the result with [`fb_string_free`]. Null on failure.
///
/// # Safety
/// `format` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_get_expiration_date(format: *const c_char) -> *mut c_char {
    // SAFETY: forwarded from this function's contract.
    let result = unsafe { arg(format, "format") }.and_then(|f| current()?.expiration_date(f));
    into_c_string("getExpirationDate", result)
}

/// # Safety
/// `permission` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_is_permission_granted(permission: *const c_char) -> bool {
    // SAFETY: forwarded from this function's contract.
    let result = unsafe { arg(permission, "permission") }
        .and_then(|p| current()?.is_permission_granted(p));
    report("isPermissionGranted", result, false)
}

/// Deliver queued notifications to the registered callbacks on the calling
/// thread. Returns how many were processed.
#[unsafe(no_mangle)]
pub extern "C" fn fb_dispatch_notifications() -> c_int {
    match current() {
        Ok(adapter) => c_int::try_from(adapter.dispatch_pending()).unwrap_or(c_int::MAX),
        Err(_) => 0,
    }
}

/// Release a string returned by this API. Null is ignored.
///
/// # Safety
/// `value` must be null or a pointer returned by this API and not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fb_string_free(value: *mut c_char) {
    if !value.is_null() {
        // SAFETY: allocated by `CString::into_raw` in `into_c_string`.
        drop(unsafe { CString::from_raw(value) });
    }
}
