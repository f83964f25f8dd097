//! Privilege check for process attribution

/// Whether we can see every process's file descriptors.
#[cfg(unix)]
pub fn is_privileged() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    false
}
