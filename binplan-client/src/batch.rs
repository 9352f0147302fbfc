use std::fmt;
use std::future::Future;

use binplan_core::{ItemId, Placement};
use futures::future::join_all;

use crate::error::ClientError;

/// Outcome of every task in a batch, in submission order.
#[derive(Debug)]
pub struct Settled<K, T, E> {
    entries: Vec<(K, Result<T, E>)>,
}

/// Runs all tasks concurrently and waits for every one of them.
///
/// A failure never cancels the remaining tasks.
pub async fn settle_all<K, F, T, E>(tasks: impl IntoIterator<Item = (K, F)>) -> Settled<K, T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = tasks.into_iter().unzip();
    let results = join_all(futures).await;
    Settled {
        entries: keys.into_iter().zip(results).collect(),
    }
}

impl<K, T, E> Settled<K, T, E> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn successes(&self) -> impl Iterator<Item = (&K, &T)> {
        self.entries
            .iter()
            .filter_map(|(k, r)| r.as_ref().ok().map(|v| (k, v)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&K, &E)> {
        self.entries
            .iter()
            .filter_map(|(k, r)| r.as_ref().err().map(|e| (k, e)))
    }

    pub fn into_entries(self) -> Vec<(K, Result<T, E>)> {
        self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub item_id: ItemId,
    pub message: String,
}

/// Aggregate result of accepting an auto-layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub placed: Vec<Placement>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl From<Settled<ItemId, Placement, ClientError>> for BatchReport {
    fn from(settled: Settled<ItemId, Placement, ClientError>) -> Self {
        let mut report = BatchReport::default();
        for (item_id, result) in settled.into_entries() {
            match result {
                Ok(placement) => report.placed.push(placement),
                Err(e) => report.failures.push(BatchFailure {
                    item_id,
                    message: e.user_message(),
                }),
            }
        }
        report
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} placed, {} failed", self.placed_count(), self.failed_count())
    }
}
