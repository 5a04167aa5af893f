use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use crate::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone)]
pub enum Trigger {
    Cron {
        expr: String,
        schedule: Schedule,
        tz: Tz,
    },
    Every(Duration),
    Once {
        after: Duration,
    },
}

/// Accepts classic 5-field cron by prepending a seconds field.
pub fn normalize_cron_expr(expr: &str) -> SchedulerResult<String> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(SchedulerError::InvalidCron {
            expr: expr.to_string(),
            reason: "empty expression".to_string(),
        });
    }
    if trimmed.split_whitespace().count() == 5 {
        Ok(format!("0 {}", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

impl Trigger {
    /// Parses `expr` and resolves `tz` (IANA name such as `Europe/Moscow`).
    pub fn cron(expr: &str, tz: &str) -> SchedulerResult<Self> {
        let normalized = normalize_cron_expr(expr)?;
        let schedule = Schedule::from_str(&normalized).map_err(|e| SchedulerError::InvalidCron {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;
        let tz = Tz::from_str(tz.trim())
            .map_err(|_| SchedulerError::InvalidTimezone(tz.to_string()))?;
        Ok(Trigger::Cron {
            expr: normalized,
            schedule,
            tz,
        })
    }

    /// First fire time strictly after `after`. `anchor` is the registration time used by
    /// interval and one-shot triggers.
    pub fn next_after(&self, after: DateTime<Utc>, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Trigger::Cron { schedule, tz, .. } => schedule
                .after(&after.with_timezone(tz))
                .next()
                .map(|next| next.with_timezone(&Utc)),
            Trigger::Every(every) => {
                let every = chrono::Duration::from_std(*every).ok()?;
                let every_ms = every.num_milliseconds();
                if every_ms <= 0 {
                    return None;
                }
                if after < anchor {
                    return Some(anchor + every);
                }
                let elapsed_ms = (after - anchor).num_milliseconds();
                let steps = elapsed_ms / every_ms + 1;
                Some(anchor + chrono::Duration::milliseconds(steps * every_ms))
            }
            Trigger::Once { after: delay } => {
                let fire_at = anchor + chrono::Duration::from_std(*delay).ok()?;
                (fire_at > after).then_some(fire_at)
            }
        }
    }
}
