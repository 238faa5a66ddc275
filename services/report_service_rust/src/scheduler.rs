//! Weekly wall-clock job scheduling
//!
//! Each [`ScheduledJob`] fires on a set of weekdays at one or more local
//! times, evaluated in a single IANA zone. Every job gets its own timer task
//! and every firing runs in its own spawned task, so a slow or failing job
//! never holds up another. Fires missed while the process was down are not
//! replayed.

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use fantasy_rust_core::clock::Clock;
use futures_util::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Days searched ahead for the next fire. Two weeks covers a trigger whose
/// only weekly slot falls into a DST gap.
const LOOKAHEAD_DAYS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("scheduler already started")]
    AlreadyStarted,

    #[error("scheduler not started")]
    NotStarted,

    #[error("scheduler already stopped")]
    AlreadyStopped,
}

pub type JobCallback = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

pub struct ScheduledJob {
    name: String,
    weekdays: Vec<Weekday>,
    times: Vec<NaiveTime>,
    callback: JobCallback,
}

impl std::fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("weekdays", &self.weekdays)
            .field("times", &self.times)
            .finish()
    }
}

impl ScheduledJob {
    pub fn new<F, Fut>(name: &str, weekdays: &[Weekday], times: &[NaiveTime], callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut times = times.to_vec();
        times.sort();
        times.dedup();
        Self {
            name: name.to_string(),
            weekdays: weekdays.to_vec(),
            times,
            callback: Arc::new(move || callback().boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Earliest trigger strictly after `after`, in `tz` local time.
    ///
    /// Local times that do not exist (spring-forward gap) are skipped.
    /// Local times that occur twice (fall-back fold) fire at the earlier
    /// instant only.
    pub fn next_fire_after(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        let start = after.with_timezone(&tz).date_naive();

        (0..LOOKAHEAD_DAYS)
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .filter(|date| self.weekdays.contains(&date.weekday()))
            .flat_map(|date| self.times.iter().map(move |t| date.and_time(*t)))
            .filter_map(|local| match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
                LocalResult::None => None,
            })
            .filter(|fire| *fire > after)
            .min()
    }
}

/// Outcome counters for one job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobStats {
    pub runs: u64,
    pub failures: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Created,
    Started,
    Stopped,
}

pub struct JobScheduler {
    tz: Tz,
    clock: Arc<dyn Clock>,
    jobs: Vec<Arc<ScheduledJob>>,
    state: Arc<Mutex<SchedulerState>>,
    stats: Arc<Mutex<HashMap<String, JobStats>>>,
    shutdown: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JobScheduler {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            tz,
            clock,
            jobs: Vec::new(),
            state: Arc::new(Mutex::new(SchedulerState::Created)),
            stats: Arc::new(Mutex::new(HashMap::new())),
            shutdown,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn add_job(&mut self, job: ScheduledJob) {
        self.jobs.push(Arc::new(job));
    }

    pub fn jobs(&self) -> impl Iterator<Item = &ScheduledJob> {
        self.jobs.iter().map(|j| j.as_ref())
    }

    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        match *state {
            SchedulerState::Created => {}
            SchedulerState::Started => return Err(SchedulerError::AlreadyStarted),
            SchedulerState::Stopped => return Err(SchedulerError::AlreadyStopped),
        }
        *state = SchedulerState::Started;
        drop(state);

        let now = self.clock.now();
        let mut handles = self.handles.lock();
        for job in &self.jobs {
            match job.next_fire_after(now, self.tz) {
                Some(next) => info!(
                    "Scheduled job {} next at {}",
                    job.name,
                    next.with_timezone(&self.tz)
                ),
                None => warn!("Scheduled job {} has no upcoming trigger", job.name),
            }
            handles.push(tokio::spawn(run_job_timer(
                Arc::clone(job),
                self.tz,
                Arc::clone(&self.clock),
                Arc::clone(&self.state),
                Arc::clone(&self.stats),
                self.shutdown.subscribe(),
            )));
        }

        info!("Job scheduler started with {} jobs ({})", self.jobs.len(), self.tz);
        Ok(())
    }

    /// Stop all timers. No callback is started after this returns; firings
    /// already in flight are left to finish.
    pub fn stop(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        match *state {
            SchedulerState::Started => {}
            SchedulerState::Created => return Err(SchedulerError::NotStarted),
            SchedulerState::Stopped => return Err(SchedulerError::AlreadyStopped),
        }
        *state = SchedulerState::Stopped;
        drop(state);

        let _ = self.shutdown.send(true);
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }

        info!("Job scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == SchedulerState::Started
    }

    pub fn job_stats(&self) -> HashMap<String, JobStats> {
        self.stats.lock().clone()
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

async fn run_job_timer(
    job: Arc<ScheduledJob>,
    tz: Tz,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<SchedulerState>>,
    stats: Arc<Mutex<HashMap<String, JobStats>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut reference = clock.now();

    loop {
        let Some(next) = job.next_fire_after(reference, tz) else {
            warn!("Scheduled job {} has no upcoming trigger, timer exiting", job.name);
            return;
        };
        let wait = (next - clock.now()).to_std().unwrap_or_default();
        debug!("Job {} sleeping {:?} until {}", job.name, wait, next);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => return,
        }

        {
            // Checked under the lock so a concurrent stop() wins.
            let state = state.lock();
            if *state != SchedulerState::Started {
                return;
            }
            tokio::spawn(fire(
                Arc::clone(&job),
                Arc::clone(&clock),
                Arc::clone(&stats),
            ));
        }

        reference = next.max(clock.now());
    }
}

async fn fire(
    job: Arc<ScheduledJob>,
    clock: Arc<dyn Clock>,
    stats: Arc<Mutex<HashMap<String, JobStats>>>,
) {
    info!("Running scheduled job: {}", job.name);
    let result = (job.callback)().await;

    let mut stats = stats.lock();
    let entry = stats.entry(job.name.clone()).or_default();
    entry.runs += 1;
    entry.last_run = Some(clock.now());
    if let Err(e) = result {
        error!("Scheduled job {} failed: {:#}", job.name, e);
        entry.failures += 1;
        entry.last_error = Some(format!("{e:#}"));
    }
}
