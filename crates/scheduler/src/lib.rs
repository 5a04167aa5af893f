//! # Scheduler
//!
//! Runs named jobs on wall-clock triggers.
//!
//! - [`Trigger::Cron`]: 5- or 6-field cron expression evaluated in an IANA timezone.
//! - [`Trigger::Every`]: fixed interval anchored at registration time.
//! - [`Trigger::Once`]: single run after a delay.
//!
//! Each job moves `Idle → Due → Running → Idle`. A run never overlaps a previous run of the same
//! job: a trigger that fires while the job is still `Running` is dropped. `last_run` is the
//! trigger time of the last completed run, successful or not. Failures and panics are logged and
//! the job simply runs again at its next trigger.

mod clock;
mod error;
mod scheduler;
mod trigger;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::{Job, JobSnapshot, JobSpec, JobState, Scheduler};
pub use trigger::{normalize_cron_expr, Trigger};
