// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android Facebook SDK binding via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. The Java side is the `LoomFacebook` wrapper
// class in the player APK; its eight static methods are resolved once in
// `AndroidFacebookSdk::bind` and called through the cached IDs afterwards.
//
// ## Notifications
//
// The wrapper reports login and request results by calling two `native`
// methods on its own UI thread. Those entry points carry no context pointer,
// so the sender installed by the most recent `bind` lives in a process-wide
// slot. They only enqueue; the engine dispatches from its own thread.

#![cfg(target_os = "android")]

use std::sync::{PoisonError, RwLock};

use jni::objects::{GlobalRef, JClass, JObject, JStaticMethodID, JString, JValue, JValueOwned};
use jni::signature::{Primitive, ReturnType};
use jni::sys::{JNI_FALSE, jboolean, jint, jvalue};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, info, warn};

use fbglue_core::config::BridgeConfig;
use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::RequestDialog;

use crate::methods::SdkMethod;
use crate::notify::NotificationSender;
use crate::traits::FacebookSdk;

/// Where the native entry points deliver notifications.
static NOTIFICATION_SINK: RwLock<Option<NotificationSender>> = RwLock::new(None);

// ---------------------------------------------------------------------------
// JNI helpers
// ---------------------------------------------------------------------------

/// Obtain the process [`JavaVM`] from the global Android context.
///
/// Calls `ndk_context::android_context()` to retrieve the `JavaVM*` pointer
/// set by `android_main` or `JNI_OnLoad`.
fn java_vm() -> Result<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|e| jni_err("JavaVM::from_raw", e))
}

/// Convenience: map any `jni::errors::Error` into `FacebookError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> FacebookError {
    FacebookError::Bridge(format!("{context}: {e}"))
}

/// Take the pending Java exception, print it to logcat, clear it, and return
/// its `toString()`.
fn take_exception(env: &mut JNIEnv<'_>) -> String {
    let throwable = match env.exception_occurred() {
        Ok(throwable) if !throwable.is_null() => throwable,
        _ => return "unknown Java exception".into(),
    };
    let _ = env.exception_describe();
    let _ = env.exception_clear();

    let throwable = env.auto_local(throwable);
    env.call_method(&*throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l())
        .and_then(|obj| read_jstring(env, obj))
        .unwrap_or_else(|_| "unknown Java exception".into())
}

/// Translate a failed call, clearing any pending exception first.
fn call_error(env: &mut JNIEnv<'_>, method: SdkMethod, e: jni::errors::Error) -> FacebookError {
    match e {
        jni::errors::Error::JavaException => FacebookError::JavaException {
            method: method.name(),
            detail: take_exception(env),
        },
        other => FacebookError::Bridge(format!("{method}: {other}")),
    }
}

/// Copy a `java.lang.String` result into Rust and release the local
/// reference. `null` reads as an empty string.
fn read_jstring<'local>(env: &mut JNIEnv<'local>, obj: JObject<'local>) -> jni::errors::Result<String> {
    if obj.is_null() {
        return Ok(String::new());
    }
    let jstr = env.auto_local(JString::from(obj));
    let text: String = env.get_string(&jstr)?.into();
    Ok(text)
}

fn read_string_value<'local>(
    env: &mut JNIEnv<'local>,
    value: JValueOwned<'local>,
) -> jni::errors::Result<String> {
    let obj = value.l()?;
    read_jstring(env, obj)
}

// ---------------------------------------------------------------------------
// SDK binding
// ---------------------------------------------------------------------------

/// Android implementation of [`FacebookSdk`].
///
/// Holds a global reference to the wrapper class and the eight resolved
/// static method IDs, all valid until the process exits.
pub struct AndroidFacebookSdk {
    vm: JavaVM,
    class: GlobalRef,
    methods: [JStaticMethodID; SdkMethod::COUNT],
}

impl AndroidFacebookSdk {
    /// Resolve the wrapper class and its methods, and make `sender` the
    /// target of the native notification entry points.
    ///
    /// Must run on a thread whose class loader can see the APK classes
    /// (normally the thread that loaded the native library).
    pub fn bind(config: &BridgeConfig, sender: NotificationSender) -> Result<Self> {
        info!(class = %config.sdk_class, "Initializing Facebook for Android");

        let vm = java_vm()?;
        let (class, methods) = {
            let mut env = vm
                .attach_current_thread_permanently()
                .map_err(|e| jni_err("attach_current_thread", e))?;

            let local = env.find_class(config.sdk_class.as_str()).map_err(|_| {
                let _ = env.exception_clear();
                FacebookError::ClassNotFound(config.sdk_class.clone())
            })?;
            let local = env.auto_local(local);
            let class = env
                .new_global_ref(&*local)
                .map_err(|e| jni_err("new_global_ref", e))?;

            let mut methods = Vec::with_capacity(SdkMethod::COUNT);
            for method in SdkMethod::ALL {
                let id = env
                    .get_static_method_id(&*local, method.name(), method.signature())
                    .map_err(|e| {
                        let _ = env.exception_clear();
                        FacebookError::MethodResolution {
                            method: method.name(),
                            signature: method.signature(),
                            detail: e.to_string(),
                        }
                    })?;
                debug!(%method, signature = method.signature(), "bound");
                methods.push(id);
            }
            let methods: [JStaticMethodID; SdkMethod::COUNT] = methods
                .try_into()
                .map_err(|_| FacebookError::Bridge("method table size mismatch".into()))?;
            (class, methods)
        };

        *NOTIFICATION_SINK
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(sender);

        Ok(Self { vm, class, methods })
    }

    /// Call a bound static method. String arguments are created as local
    /// references that are deleted before this returns, on every path.
    fn invoke<T>(
        &self,
        method: SdkMethod,
        ret: ReturnType,
        args: &[&str],
        read: impl for<'local> FnOnce(&mut JNIEnv<'local>, JValueOwned<'local>) -> jni::errors::Result<T>,
    ) -> Result<T> {
        debug_assert_eq!(args.len(), method.string_args(), "{method} arity");
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("attach_current_thread", e))?;

        let mut locals = Vec::with_capacity(args.len());
        for arg in args {
            let jstr = env
                .new_string(arg)
                .map_err(|e| call_error(&mut env, method, e))?;
            locals.push(env.auto_local(jstr));
        }
        let jargs: Vec<jvalue> = locals
            .iter()
            .map(|local| JValue::Object(&**local).as_jni())
            .collect();

        let class: &JClass = self.class.as_obj().into();
        // SAFETY: the method ID was resolved against this class with the
        // signature in `SdkMethod::signature`, which `ret` and `jargs` follow.
        let value = unsafe {
            env.call_static_method_unchecked(class, self.methods[method.index()], ret, &jargs)
        };
        let result = value.and_then(|value| read(&mut env, value));
        drop(locals);

        result.map_err(|e| call_error(&mut env, method, e))
    }

    fn call_bool(&self, method: SdkMethod, args: &[&str]) -> Result<bool> {
        self.invoke(
            method,
            ReturnType::Primitive(Primitive::Boolean),
            args,
            |_, value| value.z(),
        )
    }

    fn call_void(&self, method: SdkMethod, args: &[&str]) -> Result<()> {
        self.invoke(
            method,
            ReturnType::Primitive(Primitive::Void),
            args,
            |_, value| value.v(),
        )
    }

    fn call_string(&self, method: SdkMethod, args: &[&str]) -> Result<String> {
        self.invoke(method, ReturnType::Object, args, read_string_value)
    }
}

impl FacebookSdk for AndroidFacebookSdk {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn is_active(&self) -> Result<bool> {
        self.call_bool(SdkMethod::IsActive, &[])
    }

    fn open_session_with_read_permissions(&self, permissions: &str) -> Result<bool> {
        self.call_bool(SdkMethod::OpenSessionWithReadPermissions, &[permissions])
    }

    fn request_new_publish_permissions(&self, permissions: &str) -> Result<bool> {
        self.call_bool(SdkMethod::RequestNewPublishPermissions, &[permissions])
    }

    fn show_frictionless_request_dialog(&self, dialog: &RequestDialog) -> Result<()> {
        self.call_void(
            SdkMethod::ShowFrictionlessRequestDialog,
            &[dialog.recipients.as_str(), dialog.title.as_str(), dialog.message.as_str()],
        )
    }

    fn access_token(&self) -> Result<String> {
        self.call_string(SdkMethod::GetAccessToken, &[])
    }

    fn close_and_clear_token_information(&self) -> Result<()> {
        self.call_void(SdkMethod::CloseAndClearTokenInformation, &[])
    }

    fn expiration_date(&self, format: &str) -> Result<String> {
        self.call_string(SdkMethod::GetExpirationDate, &[format])
    }

    fn is_permission_granted(&self, permission: &str) -> Result<bool> {
        self.call_bool(SdkMethod::IsPermissionGranted, &[permission])
    }
}

// ---------------------------------------------------------------------------
// Native entry points called by LoomFacebook.java
// ---------------------------------------------------------------------------

fn deliver(notify: impl FnOnce(&NotificationSender) -> Result<()>) {
    let sink = NOTIFICATION_SINK
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    match sink.as_ref() {
        Some(sender) => {
            if let Err(e) = notify(sender) {
                warn!(error = %e, "dropping Facebook notification");
            }
        }
        None => debug!("Facebook notification before bind, dropping"),
    }
}

/// `native void sessionStatusCallback(int state, String permissions, int errorCode)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_co_theengine_loomplayer_LoomFacebook_sessionStatusCallback(
    mut env: JNIEnv,
    _this: JObject,
    state: jint,
    permissions: JString,
    error_code: jint,
) {
    let permissions = if permissions.is_null() {
        String::new()
    } else {
        match env.get_string(&permissions) {
            Ok(text) => text.into(),
            Err(e) => {
                warn!(error = %e, "unreadable permissions string");
                let _ = env.exception_clear();
                String::new()
            }
        }
    };
    deliver(|sender| sender.session_status(state, permissions, error_code));
}

/// `native void frictionlessRequestCallback(boolean success)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_co_theengine_loomplayer_LoomFacebook_frictionlessRequestCallback(
    _env: JNIEnv,
    _this: JObject,
    success: jboolean,
) {
    deliver(|sender| sender.frictionless_request(success != JNI_FALSE));
}
