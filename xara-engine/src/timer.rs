use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Identifies one arming of a [`TimerSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// A single-owner delayed callback.
///
/// Arming always cancels the previous pending instance. When the callback runs it must
/// [`claim`](TimerSlot::claim) its token first; a failed claim means the slot was
/// cancelled or re-armed in the meantime and the callback has to do nothing.
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<(TimerToken, JoinHandle<()>)>,
    next: u64,
}

impl TimerSlot {
    pub fn arm<F, Fut>(&mut self, delay: Duration, on_fire: F) -> TimerToken
    where
        F: FnOnce(TimerToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        self.next = self.next.wrapping_add(1);
        let token = TimerToken(self.next);
        let fut = on_fire(token);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        });
        self.armed = Some((token, handle));
        token
    }

    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
        }
    }

    /// Releases the slot from inside its own callback. Returns false for stale tokens.
    pub fn claim(&mut self, token: TimerToken) -> bool {
        match &self.armed {
            Some((current, _)) if *current == token => {
                // Drop without aborting: the caller is the task itself.
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_pending_instance() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::default();

        for _ in 0..3 {
            let fired = fired.clone();
            slot.arm(Duration::from_secs(5), move |_| async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_slot_never_fires() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::default();
        {
            let fired = fired.clone();
            slot.arm(Duration::from_millis(300), move |_| async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(slot.is_armed());
        slot.cancel();
        assert!(!slot.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_tokens_cannot_claim() {
        let mut slot = TimerSlot::default();
        let first = slot.arm(Duration::from_secs(60), |_| async {});
        let second = slot.arm(Duration::from_secs(60), |_| async {});

        assert!(!slot.claim(first));
        assert!(slot.claim(second));
        assert!(!slot.is_armed());
    }
}
