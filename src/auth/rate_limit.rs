use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: usize = 5;
const WINDOW_SECS: u64 = 900; // 15 minutes

struct Attempts {
    by_ip: HashMap<IpAddr, Vec<Instant>>,
    last_sweep: Instant,
}

/// Failed-login counter per client IP, shared by the API and the login form.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<Attempts>>,
    max_attempts: usize,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_ATTEMPTS, Duration::from_secs(WINDOW_SECS))
    }

    pub fn with_limits(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(Attempts {
                by_ip: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_attempts,
            window,
        }
    }

    /// Returns true if blocked. Also drops stale entries for the checked IP.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut state = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(timestamps) = state.by_ip.get_mut(&ip) {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            timestamps.len() >= self.max_attempts
        } else {
            false
        }
    }

    /// Count a failure. At most once per window, IPs with only stale
    /// failures are dropped so addresses that never return don't pile up.
    pub fn record_failure(&self, ip: IpAddr) {
        let mut state = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if now.duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state.by_ip.retain(|_, timestamps| {
                timestamps.retain(|t| now.duration_since(*t) < window);
                !timestamps.is_empty()
            });
            state.last_sweep = now;
        }
        state.by_ip.entry(ip).or_default().push(now);
    }

    /// Forget all attempts for the IP (call on successful login).
    pub fn clear(&self, ip: IpAddr) {
        let mut state = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        state.by_ip.remove(&ip);
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.attempts.lock().unwrap().by_ip.len()
    }
}
