use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{Clock, SchedulerError, SchedulerResult, Trigger};

/// Upper bound on one sleep of the run loop, so clock jumps are noticed.
const MAX_IDLE: Duration = Duration::from_secs(60);

/// A scheduled unit of work.
#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    pub trigger: Trigger,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            name: name.into(),
            trigger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Due,
    Running,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Idle => "idle",
            JobState::Due => "due",
            JobState::Running => "running",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub name: String,
    pub state: JobState,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
}

struct JobEntry {
    spec: JobSpec,
    job: Arc<dyn Job>,
    anchor: DateTime<Utc>,
    state: JobState,
    next_run: Option<DateTime<Utc>>,
    last_run: Option<DateTime<Utc>>,
}

pub struct Scheduler {
    clock: Arc<dyn Clock>,
    jobs: Arc<Mutex<Vec<JobEntry>>>,
}

fn lock(jobs: &Mutex<Vec<JobEntry>>) -> MutexGuard<'_, Vec<JobEntry>> {
    jobs.lock().unwrap_or_else(|e| e.into_inner())
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a job; its first fire time is computed from the clock's current time.
    pub fn add_job(&self, spec: JobSpec, job: Arc<dyn Job>) -> SchedulerResult<()> {
        if matches!(spec.trigger, Trigger::Every(d) if d.is_zero()) {
            return Err(SchedulerError::ZeroInterval(spec.name));
        }
        let mut jobs = lock(&self.jobs);
        if jobs.iter().any(|e| e.spec.name == spec.name) {
            return Err(SchedulerError::DuplicateJob(spec.name));
        }

        let anchor = self.clock.now();
        let next_run = spec.trigger.next_after(anchor, anchor);
        info!(job = %spec.name, next_run = ?next_run, "Job registered");
        jobs.push(JobEntry {
            spec,
            job,
            anchor,
            state: JobState::Idle,
            next_run,
            last_run: None,
        });
        Ok(())
    }

    /// Starts every job whose next fire time is at or before `now`.
    ///
    /// Returns the supervising task of each started run; it completes after the job finished
    /// and its state was recorded. Triggers of jobs still running are dropped.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<JoinHandle<()>> {
        let mut started = Vec::new();
        let mut jobs = lock(&self.jobs);

        for entry in jobs.iter_mut() {
            let Some(fire_at) = entry.next_run.filter(|t| *t <= now) else {
                continue;
            };
            entry.next_run = entry.spec.trigger.next_after(now, entry.anchor);

            if entry.state == JobState::Running {
                warn!(
                    job = %entry.spec.name,
                    trigger_time = %fire_at,
                    "Previous run still in progress, trigger dropped"
                );
                continue;
            }
            entry.state = JobState::Due;
            started.push((entry.spec.name.clone(), entry.job.clone(), fire_at));
        }

        for (name, _, _) in &started {
            if let Some(entry) = jobs.iter_mut().find(|e| &e.spec.name == name) {
                entry.state = JobState::Running;
            }
        }
        drop(jobs);

        started
            .into_iter()
            .map(|(name, job, fire_at)| self.spawn_run(name, job, fire_at))
            .collect()
    }

    fn spawn_run(&self, name: String, job: Arc<dyn Job>, fire_at: DateTime<Utc>) -> JoinHandle<()> {
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            info!(job = %name, trigger_time = %fire_at, "Job started");
            let outcome = tokio::spawn(async move { job.run().await }).await;
            match outcome {
                Ok(Ok(())) => info!(job = %name, "Job finished"),
                Ok(Err(e)) => error!(job = %name, error = %e, "Job failed"),
                Err(join_err) => error!(job = %name, error = %join_err, "Job panicked"),
            }

            let mut jobs = lock(&jobs);
            if let Some(entry) = jobs.iter_mut().find(|e| e.spec.name == name) {
                entry.state = JobState::Idle;
                entry.last_run = Some(fire_at);
            }
        })
    }

    fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        lock(&self.jobs).iter().filter_map(|e| e.next_run).min()
    }

    /// Runs until `cancel` fires. Jobs already running are left to finish on their own.
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: CancellationToken) {
        info!(jobs = lock(&self.jobs).len(), "Scheduler started");
        loop {
            let now = self.clock.now();
            self.tick(now);

            let sleep_for = match self.next_wakeup() {
                Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO).min(MAX_IDLE),
                None => MAX_IDLE,
            };
            debug!(sleep_ms = sleep_for.as_millis() as u64, "Scheduler sleeping");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }
        info!("Scheduler stopped");
    }

    pub fn snapshot(&self) -> Vec<JobSnapshot> {
        lock(&self.jobs)
            .iter()
            .map(|e| JobSnapshot {
                name: e.spec.name.clone(),
                state: e.state,
                last_run: e.last_run,
                next_run: e.next_run,
            })
            .collect()
    }

    pub fn job(&self, name: &str) -> Option<JobSnapshot> {
        self.snapshot().into_iter().find(|s| s.name == name)
    }
}
