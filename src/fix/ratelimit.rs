//! A sliding-window outbound rate limiter.
//!
//! Bounds how many application messages the engine will hand to the transport in a
//! trailing time window, matching how exchange gateways commonly throttle client
//! traffic (`MaxMessagesNo` messages per `MaxMessagesPeriodInSec`). The limiter only
//! tracks timestamps; it does not drop or delay on its own, callers decide what to do
//! when [`RateLimiter::try_acquire`] returns `false`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub(super) struct RateLimiter {
    max_messages: u32,
    period: Duration,
    sent: VecDeque<Instant>,
}

impl RateLimiter {
    pub(super) fn new(max_messages: u32, period: Duration) -> Self {
        RateLimiter {
            max_messages,
            period,
            sent: VecDeque::with_capacity(max_messages as usize),
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(&oldest) = self.sent.front() {
            if now.duration_since(oldest) >= self.period {
                self.sent.pop_front();
            } else {
                break;
            }
        }
    }

    /// Returns `true` and records the send if the window has capacity, `false` otherwise.
    pub(super) fn try_acquire_at(&mut self, now: Instant) -> bool {
        self.evict_expired(now);
        if self.sent.len() >= self.max_messages as usize {
            return false;
        }
        self.sent.push_back(now);
        true
    }

    #[allow(dead_code)]
    pub(super) fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let mut rl = RateLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(rl.try_acquire_at(t0));
        assert!(rl.try_acquire_at(t0));
        assert!(!rl.try_acquire_at(t0));
    }

    #[test]
    fn window_slides_forward() {
        let mut rl = RateLimiter::new(1, Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(rl.try_acquire_at(t0));
        assert!(!rl.try_acquire_at(t0 + Duration::from_millis(50)));
        assert!(rl.try_acquire_at(t0 + Duration::from_millis(150)));
    }
}
