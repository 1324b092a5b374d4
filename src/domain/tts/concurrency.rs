use crate::error::{TtsError, TtsResult};
use std::future::Future;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Maximum number of synthesis calls allowed in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyBudget {
    Limited(NonZeroUsize),
    Unbounded,
}

impl ConcurrencyBudget {
    pub fn limited(max: usize) -> TtsResult<Self> {
        NonZeroUsize::new(max)
            .map(ConcurrencyBudget::Limited)
            .ok_or_else(|| TtsError::InvalidConcurrencyBudget(max.to_string()))
    }

    /// `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match self {
            ConcurrencyBudget::Limited(max) => Some(max.get()),
            ConcurrencyBudget::Unbounded => None,
        }
    }
}

impl TryFrom<i64> for ConcurrencyBudget {
    type Error = TtsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(TtsError::InvalidConcurrencyBudget(value.to_string()));
        }
        usize::try_from(value)
            .map_err(|_| TtsError::InvalidConcurrencyBudget(value.to_string()))
            .and_then(ConcurrencyBudget::limited)
    }
}

impl FromStr for ConcurrencyBudget {
    type Err = TtsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        match value.to_lowercase().as_str() {
            "unbounded" | "unlimited" | "infinity" | "inf" => Ok(ConcurrencyBudget::Unbounded),
            _ => value
                .parse::<i64>()
                .map_err(|_| TtsError::InvalidConcurrencyBudget(value.to_string()))
                .and_then(ConcurrencyBudget::try_from),
        }
    }
}

impl std::fmt::Display for ConcurrencyBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcurrencyBudget::Limited(max) => write!(f, "{}", max),
            ConcurrencyBudget::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Gate that keeps at most `budget` tasks running.
///
/// Waiters are admitted in the order they started waiting (the underlying
/// semaphore is fair). An unbounded limiter admits everything immediately.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    budget: ConcurrencyBudget,
    semaphore: Option<Arc<Semaphore>>,
    in_flight: Arc<AtomicUsize>,
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    pub fn new(budget: ConcurrencyBudget) -> Self {
        let semaphore = budget.limit().map(|max| Arc::new(Semaphore::new(max)));
        Self {
            budget,
            semaphore,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn budget(&self) -> ConcurrencyBudget {
        self.budget
    }

    /// Tasks currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait for a free slot, then drive `task` to completion while holding it
    pub async fn run<T, F>(&self, task: F) -> TtsResult<T>
    where
        F: Future<Output = TtsResult<T>>,
    {
        let _permit = match &self.semaphore {
            Some(semaphore) => Some(
                semaphore
                    .acquire()
                    .await
                    .map_err(|_| TtsError::LimiterClosed)?,
            ),
            None => None,
        };

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard(self.in_flight.clone());

        task.await
    }
}
