/// Fetch state definitions for registry entries
///
/// This module defines the states a registered URL can be in and the outcome
/// type the batch coordinator writes back into the registry.
use std::fmt;

/// Represents the fetch state of a registered URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchState {
    /// URL has been registered but not fetched since the last reset
    #[default]
    Unfetched,

    /// Page was fetched and its content extracted
    Success,

    /// Fetch or extraction failed; the entry payload holds the error message
    Error,
}

impl FetchState {
    /// Returns true if a fetch has reached an outcome for this entry
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unfetched)
    }

    /// Short lowercase name used in logs and listings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unfetched => "unfetched",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Single-character marker for list displays
    pub fn marker(&self) -> char {
        match self {
            Self::Unfetched => ' ',
            Self::Success => '✓',
            Self::Error => '✗',
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one worker run, as recorded in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Extracted payload text
    Success(String),

    /// Human-readable error message
    Error(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The fetch state this outcome moves an entry into
    pub fn state(&self) -> FetchState {
        match self {
            Self::Success(_) => FetchState::Success,
            Self::Error(_) => FetchState::Error,
        }
    }
}

/// One registered URL with its fetch state and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Normalized, scheme-qualified URL
    pub url: String,

    /// Current fetch state
    pub state: FetchState,

    /// Extracted text, or the error message for failed fetches
    pub payload: Option<String>,

    /// Error message of the last failed fetch
    pub error_message: Option<String>,
}

impl UrlEntry {
    /// Creates an unfetched entry
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: FetchState::Unfetched,
            payload: None,
            error_message: None,
        }
    }

    /// Overwrites state and payload with a worker outcome
    pub fn apply(&mut self, outcome: Outcome) {
        self.state = outcome.state();
        match outcome {
            Outcome::Success(text) => {
                self.payload = Some(text);
                self.error_message = None;
            }
            Outcome::Error(message) => {
                self.payload = Some(message.clone());
                self.error_message = Some(message);
            }
        }
    }

    /// Clears any previous outcome
    pub fn reset(&mut self) {
        self.state = FetchState::Unfetched;
        self.payload = None;
        self.error_message = None;
    }
}
