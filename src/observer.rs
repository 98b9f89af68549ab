//! Report subscribers. A host registers observers on a
//! [`QualityEvaluator`](crate::quality::QualityEvaluator) and receives every
//! report it produces, in registration order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::quality::QualityReport;

pub trait ReportObserver: Send + Sync {
    fn on_report(&self, report: &QualityReport);
}

impl<F> ReportObserver for F
where
    F: Fn(&QualityReport) + Send + Sync,
{
    fn on_report(&self, report: &QualityReport) {
        self(report)
    }
}

/// Keeps the reports it sees, oldest first. Clones share the same buffer, so a
/// test can hand one clone to the evaluator and inspect the other.
///
/// The buffer is unbounded unless built with [`RecordingObserver::with_capacity`];
/// long-lived hosts should bound it or drain it with [`RecordingObserver::take`].
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    reports: Arc<Mutex<VecDeque<QualityReport>>>,
    capacity: Option<usize>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` reports, dropping the oldest first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reports: Arc::default(),
            capacity: Some(capacity),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<QualityReport>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain the buffer, returning what was recorded so far.
    pub fn take(&self) -> Vec<QualityReport> {
        self.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn reports(&self) -> Vec<QualityReport> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<QualityReport> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportObserver for RecordingObserver {
    fn on_report(&self, report: &QualityReport) {
        let mut reports = self.lock();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while reports.len() >= capacity {
                reports.pop_front();
            }
        }
        reports.push_back(report.clone());
    }
}
