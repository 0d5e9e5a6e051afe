//! Circuit breaker for one upstream provider
//!
//! Tracks call outcomes and derives one of three states:
//! - `Closed`: normal operation
//! - `Open`: recent failures crossed the threshold, skip this provider
//! - `HalfOpen`: reset timeout elapsed, probing for recovery
//!
//! State is packed into atomics so readers (the resolver, frequently) never
//! contend with writers (the gateway recording outcomes).

use council_domain::{CircuitState, ProviderKey};
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const STATE_CLOSED: u8 = 0;
const STATE_OPEN: u8 = 1;
const STATE_HALF_OPEN: u8 = 2;

fn encode(state: CircuitState) -> u8 {
    match state {
        CircuitState::Closed => STATE_CLOSED,
        CircuitState::Open => STATE_OPEN,
        CircuitState::HalfOpen => STATE_HALF_OPEN,
    }
}

fn decode(raw: u8) -> CircuitState {
    match raw {
        STATE_OPEN => CircuitState::Open,
        STATE_HALF_OPEN => CircuitState::HalfOpen,
        _ => CircuitState::Closed,
    }
}

/// Thresholds and timing for a provider breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failures within the window before the circuit opens.
    pub failure_threshold: u32,
    /// Successes in half-open state needed to close again.
    pub success_threshold: u32,
    /// How long an open circuit waits before probing.
    pub reset_timeout: Duration,
    /// Rolling window for the failure count.
    pub failure_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(30),
            failure_window: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_failure_window(mut self, window: Duration) -> Self {
        self.failure_window = window;
        self
    }
}

/// Breaker guarding calls to a single provider
pub struct CircuitBreaker {
    provider: ProviderKey,
    config: CircuitBreakerConfig,
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure_at: AtomicU64,
    opened_at: AtomicU64,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(provider: ProviderKey, config: CircuitBreakerConfig) -> Self {
        Self {
            provider,
            config,
            state: AtomicU8::new(STATE_CLOSED),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure_at: AtomicU64::new(0),
            opened_at: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_defaults(provider: ProviderKey) -> Self {
        Self::new(provider, CircuitBreakerConfig::default())
    }

    #[must_use]
    pub fn provider(&self) -> &ProviderKey {
        &self.provider
    }

    /// Current state, advancing `Open` to `HalfOpen` once the reset
    /// timeout has elapsed.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.advance_after_timeout();
        decode(self.state.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Record a successful call against this provider.
    pub fn record_success(&self) {
        match decode(self.state.load(Ordering::SeqCst)) {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::SeqCst);
            }
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    provider = %self.provider,
                    successes,
                    threshold = self.config.success_threshold,
                    "Probe call succeeded in half-open state"
                );
                if successes >= self.config.success_threshold {
                    self.close();
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call against this provider.
    pub fn record_failure(&self) {
        let now = now_millis();

        match decode(self.state.load(Ordering::SeqCst)) {
            CircuitState::Closed => {
                // Stale failures outside the rolling window do not count.
                let last = self.last_failure_at.load(Ordering::SeqCst);
                if last > 0 && Duration::from_millis(now.saturating_sub(last)) > self.config.failure_window {
                    self.failure_count.store(0, Ordering::SeqCst);
                }

                self.last_failure_at.store(now, Ordering::SeqCst);
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    provider = %self.provider,
                    failures,
                    threshold = self.config.failure_threshold,
                    "Provider call failure recorded"
                );
                if failures >= self.config.failure_threshold {
                    self.open();
                }
            }
            CircuitState::HalfOpen => {
                warn!(provider = %self.provider, "Probe call failed, reopening circuit");
                self.open();
            }
            CircuitState::Open => {}
        }
    }

    /// Force the breaker back to closed.
    pub fn reset(&self) {
        self.close();
    }

    fn advance_after_timeout(&self) {
        if self.state.load(Ordering::SeqCst) != STATE_OPEN {
            return;
        }
        let opened = self.opened_at.load(Ordering::SeqCst);
        let elapsed = Duration::from_millis(now_millis().saturating_sub(opened));
        if elapsed >= self.config.reset_timeout
            && self
                .state
                .compare_exchange(STATE_OPEN, STATE_HALF_OPEN, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            info!(provider = %self.provider, "Circuit entering half-open state");
            self.success_count.store(0, Ordering::SeqCst);
            self.failure_count.store(0, Ordering::SeqCst);
        }
    }

    fn open(&self) {
        if self.state.swap(STATE_OPEN, Ordering::SeqCst) != STATE_OPEN {
            info!(
                provider = %self.provider,
                failures = self.failure_count.load(Ordering::SeqCst),
                "Circuit opened"
            );
            self.opened_at.store(now_millis(), Ordering::SeqCst);
        }
    }

    fn close(&self) {
        if self.state.swap(STATE_CLOSED, Ordering::SeqCst) != STATE_CLOSED {
            info!(provider = %self.provider, "Circuit closed");
        }
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
