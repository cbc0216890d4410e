//! Progress events emitted while a batch runs
//!
//! Events are delivered in completion order through an unbounded channel,
//! so workers never wait on the consumer.

use std::fmt;

/// Lifecycle point of a single URL within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressPhase {
    /// A worker picked up the URL
    Started,
    /// Content was extracted and recorded
    Completed,
    /// The fetch failed; the error message was recorded as payload
    Failed,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns true once the URL has reached an outcome
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }
}

/// Incremental notification about one URL of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Position of the URL in the submitted batch (0-based)
    pub index: usize,

    /// Number of URLs in the batch
    pub total: usize,

    /// The URL this event is about
    pub url: String,

    pub phase: ProgressPhase,

    /// URLs that reached an outcome so far, including this one
    pub completed: usize,
}

impl ProgressEvent {
    /// Share of the batch that has finished, `completed / total * 100`
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {:>5.1}% {} {}",
            self.index + 1,
            self.total,
            self.percent(),
            self.phase.as_str(),
            self.url
        )
    }
}
