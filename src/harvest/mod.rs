//! Harvest module for concurrent page fetching
//!
//! This module contains the fetch-and-extract pipeline, including:
//! - HTTP fetching with a fixed timeout and user agent
//! - Per-URL workers that turn every failure into a recorded outcome
//! - Bounded-concurrency batch coordination with cancellation
//! - Progress events streamed back to the caller

mod coordinator;
mod fetcher;
mod progress;

pub use coordinator::{BatchCoordinator, BatchHandle, BatchReport, BatchSummary};
pub use fetcher::{build_http_client, fetch_page, run_worker, FailureKind, FetchError};
pub use progress::{ProgressEvent, ProgressPhase};
