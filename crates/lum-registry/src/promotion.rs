//! Auto-promotion scheduler: one deferred task per accepted submission.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::reconcile::BackupAuthority;
use crate::registry::{PendingTicket, Registry};

/// Arm the one-shot auto-promotion for a fresh submission.
///
/// Sleeps for the ticket's delay, then promotes the HWID to whitelisted —
/// only if it is still pending under the same submission epoch. An
/// explicit whitelist, blacklist, or delete that landed meanwhile makes
/// the firing a no-op; the registry lock is the serialization point, so
/// explicit action always wins the race.
///
/// When an authority is supplied, a successful promotion is reported to
/// it fire-and-forget: a failed notification is logged and never rolls
/// back or blocks the local promotion.
pub fn schedule(
    registry: Arc<Registry>,
    ticket: PendingTicket,
    authority: Option<Arc<dyn BackupAuthority>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(ticket.promote_after).await;
        if !registry.auto_promote(&ticket.hwid, ticket.epoch) {
            tracing::debug!(hwid = %ticket.hwid, "promotion timer preempted, no-op");
            return;
        }
        tracing::info!(hwid = %ticket.hwid, "hwid auto-promoted to whitelist");
        if let Some(authority) = authority {
            if let Err(e) = authority.notify_auto_whitelisted(&ticket.hwid).await {
                tracing::warn!(
                    hwid = %ticket.hwid,
                    error = %e,
                    "failed to notify backup authority of auto-promotion"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use lum_core::Hwid;

    use crate::record::{ClassificationMeta, HwidVerdict};
    use crate::reconcile::{BackupError, BackupVerdict};

    fn hwid(s: &str) -> Hwid {
        Hwid::new(s).unwrap()
    }

    /// Authority double that counts notifications and can be told to fail.
    struct CountingAuthority {
        notified: AtomicUsize,
        fail: bool,
    }

    impl CountingAuthority {
        fn new(fail: bool) -> Self {
            Self {
                notified: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl BackupAuthority for CountingAuthority {
        async fn lookup(&self, _hwid: &Hwid, _status: bool) -> Result<BackupVerdict, BackupError> {
            Ok(BackupVerdict { found: false })
        }

        async fn notify_auto_whitelisted(&self, _hwid: &Hwid) -> Result<(), BackupError> {
            self.notified.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BackupError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timer_promotes_still_pending_hwid() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, None);
        handle.await.unwrap();
        assert!(matches!(
            registry.check(&hwid("ABC123")),
            HwidVerdict::Whitelisted(m) if m.is_empty()
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_does_not_overwrite_explicit_blacklist() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, None);
        registry
            .set_blacklisted(
                &hwid("ABC123"),
                ClassificationMeta {
                    reason: Some("cheating".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        handle.await.unwrap();
        assert!(matches!(
            registry.check(&hwid("ABC123")),
            HwidVerdict::Blacklisted(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_is_noop_after_delete() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, None);
        registry.delete(&hwid("ABC123")).unwrap();
        handle.await.unwrap();
        assert!(matches!(
            registry.check(&hwid("ABC123")),
            HwidVerdict::NotFound { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn promotion_notifies_authority() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let authority = Arc::new(CountingAuthority::new(false));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, Some(authority.clone()));
        handle.await.unwrap();
        assert_eq!(authority.notified.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notify_failure_does_not_roll_back_promotion() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let authority = Arc::new(CountingAuthority::new(true));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, Some(authority.clone()));
        handle.await.unwrap();
        assert_eq!(authority.notified.load(Ordering::SeqCst), 1);
        assert!(matches!(
            registry.check(&hwid("ABC123")),
            HwidVerdict::Whitelisted(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn preempted_timer_does_not_notify_authority() {
        let registry = Arc::new(Registry::with_delay(Duration::from_secs(300)));
        let authority = Arc::new(CountingAuthority::new(false));
        let ticket = registry.submit(hwid("ABC123")).unwrap();
        let handle = schedule(registry.clone(), ticket, Some(authority.clone()));
        registry
            .set_whitelisted(&hwid("ABC123"), ClassificationMeta::default())
            .unwrap();
        handle.await.unwrap();
        assert_eq!(authority.notified.load(Ordering::SeqCst), 0);
    }
}
