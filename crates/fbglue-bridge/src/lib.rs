// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// fbglue — Facebook SDK bridge for the Loom engine.
//
// The engine talks to a `FacebookAdapter` (or to the C functions in `capi`);
// the adapter forwards to a `FacebookSdk` implementation, which on Android is
// the JNI binding to the Java `LoomFacebook` wrapper. Results the Java side
// reports asynchronously travel back through a notification channel and are
// dispatched on the engine's own thread.

pub mod adapter;
pub mod capi;
pub mod methods;
pub mod notify;
pub mod recording;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use fbglue_core::config::BridgeConfig;
use fbglue_core::error::Result;

pub use adapter::{Callbacks, FacebookAdapter};
pub use notify::{NotificationReceiver, NotificationSender, notification_channel};
pub use traits::FacebookSdk;

/// Binds the SDK implementation for the target operating system.
///
/// On Android this resolves the wrapper class and all its methods, and
/// routes native notifications to `sender`. Elsewhere it returns the stub.
pub fn platform_sdk(config: &BridgeConfig, sender: NotificationSender) -> Result<Box<dyn FacebookSdk>> {
    #[cfg(target_os = "android")]
    {
        // Android: Uses `jni-rs` to call the static methods on the JVM/ART.
        Ok(Box::new(android::AndroidFacebookSdk::bind(config, sender)?))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: nothing to bind; notifications never arrive.
        let _ = (config, sender);
        Ok(Box::new(stub::StubFacebookSdk))
    }
}
