//! Startup precondition: binding L2CAP PSMs 17 and 19 requires root.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("btkbd must run as root to bind the HID L2CAP PSMs (effective uid is {euid})")]
    NotPrivileged { euid: u32 },
}

/// Fails unless `euid` is 0.
pub fn check_privilege(euid: u32) -> Result<(), PreconditionError> {
    if euid == 0 {
        Ok(())
    } else {
        Err(PreconditionError::NotPrivileged { euid })
    }
}

/// Checks the effective uid of this process.
pub fn ensure_privileged() -> Result<(), PreconditionError> {
    check_privilege(effective_uid())
}

#[cfg(target_os = "linux")]
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

// Only BlueZ can host the keyboard, so other platforms never qualify.
#[cfg(not(target_os = "linux"))]
fn effective_uid() -> u32 {
    u32::MAX
}
