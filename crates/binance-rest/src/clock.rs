//! Timestamp source for signed requests
//!
//! Binance rejects signed requests whose `timestamp` is too far from its own
//! clock, so by default every signed call asks the exchange for the time
//! first. The other policies trade that round-trip for a cached offset or the
//! local clock.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::RestResult;

/// How signed requests obtain their timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Fetch server time before every signed request
    #[default]
    ServerTimeEachRequest,
    /// Fetch server time once and reuse the `server - local` offset until it
    /// is older than `refresh_after`
    CachedOffset {
        /// Age after which the offset is fetched again
        refresh_after: Duration,
    },
    /// Use the local clock, no extra request
    LocalClock,
}

/// Current local time in milliseconds since the Unix epoch
pub fn local_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
struct Offset {
    millis: i64,
    fetched_at: Instant,
}

/// Produces request timestamps according to a [`TimestampPolicy`]
#[derive(Debug)]
pub(crate) struct ServerClock {
    policy: TimestampPolicy,
    offset: Mutex<Option<Offset>>,
}

impl ServerClock {
    pub(crate) fn new(policy: TimestampPolicy) -> Self {
        Self {
            policy,
            offset: Mutex::new(None),
        }
    }

    pub(crate) fn policy(&self) -> TimestampPolicy {
        self.policy
    }

    /// Timestamp for the next signed request
    ///
    /// `fetch` is called when the policy needs the exchange's time.
    pub(crate) async fn now<F, Fut>(&self, fetch: F) -> RestResult<u64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RestResult<u64>>,
    {
        match self.policy {
            TimestampPolicy::ServerTimeEachRequest => fetch().await,
            TimestampPolicy::LocalClock => Ok(local_millis()),
            TimestampPolicy::CachedOffset { refresh_after } => {
                if let Some(timestamp) = self.cached(refresh_after) {
                    return Ok(timestamp);
                }

                let server_time = fetch().await?;
                self.record(server_time);
                Ok(server_time)
            }
        }
    }

    fn cached(&self, refresh_after: Duration) -> Option<u64> {
        let offset = (*self.offset.lock())?;
        if offset.fetched_at.elapsed() >= refresh_after {
            return None;
        }

        let local = i64::try_from(local_millis()).ok()?;
        u64::try_from(local + offset.millis).ok()
    }

    fn record(&self, server_time: u64) {
        let local = local_millis();
        let millis = server_time as i64 - local as i64;
        debug!(offset_ms = millis, "Cached server clock offset");

        *self.offset.lock() = Some(Offset {
            millis,
            fetched_at: Instant::now(),
        });
    }
}
