use std::future::Future;
use tokio::task::AbortHandle;
use tokio::time::{Duration, Instant};

#[derive(Debug)]
struct Armed {
    epoch: u64,
    deadline: Instant,
    handle: AbortHandle,
}

/// Per-room session timer.
///
/// Every arm bumps an epoch and aborts the previous task. The expiry handler
/// receives its epoch and must call [`Countdown::fire`] under the room lock,
/// which only succeeds for the most recent arm. A handler that was already
/// running when the timer got re-armed therefore becomes a no-op.
#[derive(Debug, Default)]
pub struct Countdown {
    epoch: u64,
    armed: Option<Armed>,
}

impl Countdown {
    /// Schedules `on_expire(epoch)` to run after `duration`, superseding any
    /// earlier arm. Returns the new epoch, or `None` without touching the
    /// current timer when the deadline is not representable.
    pub fn arm<F, Fut>(&mut self, duration: Duration, on_expire: F) -> Option<u64>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let deadline = Instant::now().checked_add(duration)?;
        self.cancel();
        self.epoch += 1;
        let epoch = self.epoch;
        let expiry = on_expire(epoch);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            expiry.await;
        });
        self.armed = Some(Armed {
            epoch,
            deadline,
            handle: handle.abort_handle(),
        });
        Some(epoch)
    }

    /// Aborts the pending timer, if any.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Claims the expiry for `epoch`. False when the timer was cancelled or
    /// re-armed since that epoch was handed out.
    pub fn fire(&mut self, epoch: u64) -> bool {
        if self.armed.as_ref().is_some_and(|armed| armed.epoch == epoch) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .map(|armed| armed.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
