// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The eight static entry points of the Java SDK wrapper, by JNI name and
// type signature.

/// A static method on the SDK wrapper class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkMethod {
    IsActive,
    OpenSessionWithReadPermissions,
    RequestNewPublishPermissions,
    ShowFrictionlessRequestDialog,
    GetAccessToken,
    CloseAndClearTokenInformation,
    GetExpirationDate,
    IsPermissionGranted,
}

impl SdkMethod {
    pub const COUNT: usize = 8;

    /// Binding order.
    pub const ALL: [SdkMethod; Self::COUNT] = [
        SdkMethod::IsActive,
        SdkMethod::OpenSessionWithReadPermissions,
        SdkMethod::RequestNewPublishPermissions,
        SdkMethod::ShowFrictionlessRequestDialog,
        SdkMethod::GetAccessToken,
        SdkMethod::CloseAndClearTokenInformation,
        SdkMethod::GetExpirationDate,
        SdkMethod::IsPermissionGranted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SdkMethod::IsActive => "isActive",
            SdkMethod::OpenSessionWithReadPermissions => "openSessionWithReadPermissions",
            SdkMethod::RequestNewPublishPermissions => "requestNewPublishPermissions",
            SdkMethod::ShowFrictionlessRequestDialog => "showFrictionlessRequestDialog",
            SdkMethod::GetAccessToken => "getAccessToken",
            SdkMethod::CloseAndClearTokenInformation => "closeAndClearTokenInformation",
            SdkMethod::GetExpirationDate => "getExpirationDate",
            SdkMethod::IsPermissionGranted => "isPermissionGranted",
        }
    }

    pub fn signature(self) -> &'static str {
        match self {
            SdkMethod::IsActive => "()Z",
            SdkMethod::OpenSessionWithReadPermissions => "(Ljava/lang/String;)Z",
            SdkMethod::RequestNewPublishPermissions => "(Ljava/lang/String;)Z",
            SdkMethod::ShowFrictionlessRequestDialog => {
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V"
            }
            SdkMethod::GetAccessToken => "()Ljava/lang/String;",
            SdkMethod::CloseAndClearTokenInformation => "()V",
            SdkMethod::GetExpirationDate => "(Ljava/lang/String;)Ljava/lang/String;",
            SdkMethod::IsPermissionGranted => "(Ljava/lang/String;)Z",
        }
    }

    /// Position in [`SdkMethod::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of `java.lang.String` parameters.
    pub fn string_args(self) -> usize {
        self.signature()
            .split(')')
            .next()
            .map_or(0, |params| params.matches("Ljava/lang/String;").count())
    }
}

impl std::fmt::Display for SdkMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
