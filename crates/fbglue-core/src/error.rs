// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for fbglue.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum FacebookError {
    // -- Binding --
    #[error("SDK class not found: {0}")]
    ClassNotFound(String),

    #[error("failed to resolve {method}{signature}: {detail}")]
    MethodResolution {
        method: &'static str,
        signature: &'static str,
        detail: String,
    },

    #[error("bridge not initialized")]
    NotInitialized,

    // -- Calls --
    #[error("{method} threw: {detail}")]
    JavaException { method: &'static str, detail: String },

    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("{operation} result is {len} bytes, limit is {max}")]
    ResultTooLong {
        operation: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("notification channel closed")]
    ChannelClosed,

    // -- Config --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Facebook SDK not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FacebookError>;
