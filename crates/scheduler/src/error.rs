use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Interval must be positive for job {0}")]
    ZeroInterval(String),

    #[error("Job already registered: {0}")]
    DuplicateJob(String),
}

pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
