//! Cooperative shutdown.
//!
//! The sampling loop polls a [`ShutdownFlag`] once per iteration. Signal
//! handlers only store `true` into the flag; everything else happens on the
//! loop's own thread.

use crate::error::{MonitorError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared stop request.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn request(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Returns true once shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

/// Flag the signal handler writes to. Bound on first install.
static SIGNAL_TARGET: OnceLock<Arc<AtomicBool>> = OnceLock::new();

#[cfg(unix)]
extern "C" fn on_signal(_signum: libc::c_int) {
    if let Some(flag) = SIGNAL_TARGET.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Routes SIGINT and SIGTERM to `flag`.
///
/// Handlers are process-wide, so only one flag can ever be bound; installing
/// again with the same flag is allowed.
///
/// # Errors
///
/// Returns [`MonitorError::SignalSetup`] if another flag is already bound or
/// the OS rejects the handler.
#[allow(unsafe_code)]
pub fn install_signal_handlers(flag: &ShutdownFlag) -> Result<()> {
    let bound = SIGNAL_TARGET.get_or_init(|| Arc::clone(&flag.inner));
    if !Arc::ptr_eq(bound, &flag.inner) {
        return Err(MonitorError::SignalSetup(
            "signal handlers are already bound to another flag".to_string(),
        ));
    }

    #[cfg(unix)]
    {
        // SAFETY: `action` is fully initialised before use and `on_signal`
        // only performs an atomic store, which is async-signal-safe.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            action.sa_flags = libc::SA_RESTART;

            for signum in [libc::SIGINT, libc::SIGTERM] {
                if libc::sigaction(signum, &action, std::ptr::null_mut()) != 0 {
                    return Err(MonitorError::SignalSetup(
                        std::io::Error::last_os_error().to_string(),
                    ));
                }
            }
        }
        crate::debug!("shutdown", "SIGINT/SIGTERM handlers installed");
    }

    #[cfg(not(unix))]
    crate::warn!("shutdown", "signal handlers unsupported on this platform");

    Ok(())
}
