//! Request sessions and stale-response discarding.
//!
//! Every outbound fetch is tagged with the [`Generation`] current when it was
//! issued. When the fetch completes, its result is handed back only if that
//! generation is still current; otherwise the caller receives
//! [`Outcome::Discarded`] and must not touch shared state.
//!
//! The generation advances on every boundary-dataset change and on a hard
//! reset. Superseded requests are not aborted at the transport level; their
//! results are computed and then dropped.
//!
//! ```
//! use boundaries_explorer::session::{Outcome, RequestCoordinator};
//!
//! # tokio_test_block(async {
//! let coordinator = RequestCoordinator::new();
//! let generation = coordinator.advance();
//!
//! let outcome = coordinator.issue(generation, async { 42 }).await;
//! assert_eq!(outcome.into_current(), Some(42));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Result of a coordinated request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The request's generation is still current.
    Current(T),
    /// A newer generation superseded the request; its result was dropped.
    Discarded {
        issued: Generation,
        current: Generation,
    },
}

impl<T> Outcome<T> {
    pub fn is_discarded(&self) -> bool {
        matches!(self, Outcome::Discarded { .. })
    }

    /// The result, or `None` when discarded.
    pub fn into_current(self) -> Option<T> {
        match self {
            Outcome::Current(value) => Some(value),
            Outcome::Discarded { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Current(value) => Outcome::Current(f(value)),
            Outcome::Discarded { issued, current } => Outcome::Discarded { issued, current },
        }
    }
}

/// Shared generation counter.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestCoordinator {
    current: Arc<AtomicU64>,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation new requests should be tagged with.
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Starts a new session, invalidating every in-flight request.
    pub fn advance(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Hard reset (teardown). Same effect as [`advance`](Self::advance).
    pub fn reset(&self) -> Generation {
        self.advance()
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Awaits `fetch` and returns its output only if `generation` is still
    /// current on completion.
    pub async fn issue<F, T>(&self, generation: Generation, fetch: F) -> Outcome<T>
    where
        F: Future<Output = T>,
    {
        let value = fetch.await;
        let current = self.current();
        if current == generation {
            Outcome::Current(value)
        } else {
            Outcome::Discarded {
                issued: generation,
                current,
            }
        }
    }
}
