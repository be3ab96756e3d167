//! Microphone access policy for the simulated input device.
//!
//! Mirrors a host permission prompt: access is either granted or denied for
//! the lifetime of the device. There is no per-session re-prompt.

use media_bridge_core::BridgeError;

/// How the simulated host answers a microphone access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    #[default]
    Granted,
    Denied,
}

/// Check if microphone access is available.
///
/// A missing device is reported before the permission answer, the same order
/// a host prompt would fail in.
pub fn check_microphone_permission(policy: PermissionPolicy, device_present: bool) -> Result<(), BridgeError> {
    if !device_present {
        return Err(BridgeError::DeviceNotAvailable("no audio input device".into()));
    }
    match policy {
        PermissionPolicy::Granted => Ok(()),
        PermissionPolicy::Denied => Err(BridgeError::PermissionDenied),
    }
}
