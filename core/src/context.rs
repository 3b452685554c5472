//! Process-wide libcurl initialization as a scoped value.
//!
//! # Design
//! `TransportContext` brackets `curl_global_init` / `curl_global_cleanup`.
//! Requests borrow it, so the compiler rejects any `Request` that would
//! outlive the context it was created under. libcurl reference-counts global
//! init, which makes overlapping contexts (one per test thread, say) harmless.
//!
//! The `curl` binding also performs its own one-time global init the first
//! time an easy handle is created, and never releases it. That init is forced
//! here, under the same process-wide lock as our own init and cleanup, so no
//! easy handle creation can reach `curl_global_init` concurrently with a
//! context. Since the binding's reference is permanent, dropping a context
//! only balances that context's own init; the library itself stays up until
//! process exit.

use std::ops::BitOr;
use std::os::raw::c_long;
use std::sync::Mutex;

use tracing::debug;

use crate::error::Error;

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

/// Flags passed to `curl_global_init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalFlags(c_long);

impl GlobalFlags {
    pub const NOTHING: GlobalFlags = GlobalFlags(0);
    pub const SSL: GlobalFlags = GlobalFlags(1 << 0);
    pub const WIN32: GlobalFlags = GlobalFlags(1 << 1);
    pub const ALL: GlobalFlags = GlobalFlags(Self::SSL.0 | Self::WIN32.0);
    pub const DEFAULT: GlobalFlags = Self::ALL;

    pub fn bits(self) -> c_long {
        self.0
    }
}

impl Default for GlobalFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for GlobalFlags {
    type Output = GlobalFlags;

    fn bitor(self, rhs: Self) -> Self {
        GlobalFlags(self.0 | rhs.0)
    }
}

/// Live global initialization of the transfer engine.
///
/// Create one near the top of `main`, before any `Request`, and let it drop
/// after the last one is gone.
#[derive(Debug)]
pub struct TransportContext {
    flags: GlobalFlags,
}

impl TransportContext {
    /// Initialize with `GlobalFlags::DEFAULT`.
    pub fn init() -> Result<Self, Error> {
        Self::with_flags(GlobalFlags::DEFAULT)
    }

    pub fn with_flags(flags: GlobalFlags) -> Result<Self, Error> {
        let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        curl::init();
        let rc = unsafe { curl_sys::curl_global_init(flags.bits()) };
        if rc != curl_sys::CURLE_OK {
            let err = curl::Error::new(rc);
            return Err(Error::Init(format!(
                "curl_global_init returned {rc}: {}",
                err.description()
            )));
        }
        debug!(flags = flags.bits(), "transport context initialized");
        Ok(Self { flags })
    }

    pub fn flags(&self) -> GlobalFlags {
        self.flags
    }
}

impl Drop for TransportContext {
    fn drop(&mut self) {
        let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe { curl_sys::curl_global_cleanup() };
        debug!("transport context released");
    }
}
