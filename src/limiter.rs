//! Rate Limiter Module
//!
//! Sliding-window admission control for client-facing lookups.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

// == Rate Limiter ==
/// Admits at most `limit` operations within any trailing `period`.
///
/// Rejected calls are not queued; the caller decides what to answer. This
/// protects the hosting process only, the upstream service is paced
/// separately by the fetcher's courtesy delay.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    period: Duration,
    /// Admission instants, oldest first
    window: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            limit,
            period,
            window: VecDeque::with_capacity(limit),
        }
    }

    /// Records and admits the call if the window has room.
    pub fn is_allowed(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);

        if self.window.len() < self.limit {
            self.window.push_back(now);
            true
        } else {
            false
        }
    }

    /// Admissions left in the current window, without consuming one.
    pub fn remaining(&mut self) -> usize {
        self.prune(Instant::now());
        self.limit.saturating_sub(self.window.len())
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.window.front() {
            if now.duration_since(oldest) >= self.period {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}
