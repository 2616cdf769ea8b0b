//! Network connectivity signal
//!
//! The host application knows whether the device is online (OS network
//! events, user "offline mode" toggle). It reports that through a
//! `ConnectivityMonitor`; the remote tier is skipped while offline without
//! attempting any request.

use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the runtime currently has network connectivity
pub trait ConnectivityMonitor: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity flag updated by the host application
#[derive(Debug)]
pub struct NetworkStatus {
    online: AtomicBool,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_online() {
        assert!(NetworkStatus::default().is_online());
    }

    #[test]
    fn test_toggle() {
        let status = NetworkStatus::new(true);
        status.set_online(false);
        assert!(!status.is_online());
        status.set_online(true);
        assert!(status.is_online());
    }
}
