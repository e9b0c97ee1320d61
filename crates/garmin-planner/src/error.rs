use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for garmin-planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Plan parse error: {0}")]
    Parse(String),

    #[error("Workout build error for {date}: {message}")]
    Build { date: NaiveDate, message: String },

    #[error("Transient submit error: {0}")]
    TransientSubmit(String),

    #[error("Workout rejected by Garmin Connect: {0}")]
    PermanentSubmit(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Authentication required. Please run 'garmin-planner auth login' first.")]
    NotAuthenticated,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("{failed} of {total} workouts did not reach Garmin Connect")]
    UploadIncomplete { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Create a parse error from a message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a build error tagged with the offending day
    pub fn build(date: NaiveDate, msg: impl Into<String>) -> Self {
        Self::Build {
            date,
            message: msg.into(),
        }
    }

    /// Create a transient (retryable) submission error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientSubmit(msg.into())
    }

    /// Create a permanent (non-retryable) submission error
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::PermanentSubmit(msg.into())
    }

    /// Create an authentication error from a message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a retry may succeed. Transport timeouts and connection
    /// failures count as transient alongside explicit 5xx/429 responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransientSubmit(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the error means the session is unusable for the rest of
    /// the batch.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::NotAuthenticated)
    }
}

/// Format an error for end-user display
pub fn format_user_error(err: &PlannerError) -> String {
    match err {
        PlannerError::Http(e) if e.is_timeout() => {
            "Request timed out. Garmin Connect may be slow; try again.".to_string()
        }
        PlannerError::Http(e) if e.is_connect() => {
            "Could not reach Garmin Connect. Check your network connection.".to_string()
        }
        other => other.to_string(),
    }
}
