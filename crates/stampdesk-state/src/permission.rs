//! Camera permission seam.
//!
//! The flow asks before every scan start. There is no retry loop: a denied
//! request is reported once, and the next explicit scan asks again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

/// Platform camera permission.
#[async_trait]
pub trait CameraPermissions: Send + Sync {
    /// Whether permission is already granted.
    async fn is_granted(&self) -> bool;

    /// Prompt for permission. Returns whether it was granted.
    async fn request(&self) -> bool;
}

/// Fixed permission answers, for tests and the console front-end.
#[derive(Debug)]
pub struct StaticPermissions {
    granted: AtomicBool,
    grant_on_request: bool,
    requests: AtomicU64,
}

impl StaticPermissions {
    /// Permission already granted.
    pub fn granted() -> Self {
        Self::build(true, true)
    }

    /// Permission not granted, and every request is refused.
    pub fn denied() -> Self {
        Self::build(false, false)
    }

    /// Permission not yet granted; the first request grants it.
    pub fn prompt() -> Self {
        Self::build(false, true)
    }

    fn build(granted: bool, grant_on_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            grant_on_request,
            requests: AtomicU64::new(0),
        }
    }

    /// How many times permission was requested.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraPermissions for StaticPermissions {
    async fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request(&self) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            self.granted.store(true, Ordering::SeqCst);
        }
        self.grant_on_request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_grants_once_requested() {
        let camera = StaticPermissions::prompt();
        assert!(!camera.is_granted().await);
        assert!(camera.request().await);
        assert!(camera.is_granted().await);
        assert_eq!(camera.request_count(), 1);
    }

    #[tokio::test]
    async fn denied_stays_denied() {
        let camera = StaticPermissions::denied();
        assert!(!camera.request().await);
        assert!(!camera.request().await);
        assert!(!camera.is_granted().await);
        assert_eq!(camera.request_count(), 2);
    }
}
