//! Periodic execution of a [`Task`] with failure isolation.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_cron_scheduler::Job;

use crate::{
    error::AppError,
    scheduler::{
        runner::TaskRunner,
        schedule::{CronSchedule, Schedule, SleepSpec},
        Task,
    },
    util::guard::run_guarded,
};

/// What happens when a single invocation fails or panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log the failure and keep the schedule going.
    #[default]
    Log,
    /// Stop the task and return the failure from `start`.
    Propagate,
}

/// A task bound to a schedule and an error policy.
pub struct PeriodicTask {
    task: Arc<dyn Task>,
    schedule: Schedule,
    policy: ErrorPolicy,
}

impl PeriodicTask {
    pub fn cron(task: Arc<dyn Task>, schedule: CronSchedule) -> Self {
        Self {
            task,
            schedule: Schedule::Cron(schedule),
            policy: ErrorPolicy::Log,
        }
    }

    pub fn interval(task: Arc<dyn Task>, sleep: SleepSpec) -> Self {
        Self {
            task,
            schedule: Schedule::Interval(sleep),
            policy: ErrorPolicy::Log,
        }
    }

    pub fn propagate_errors(mut self) -> Self {
        self.policy = ErrorPolicy::Propagate;
        self
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Runs the task once, applying the error policy.
    ///
    /// # Returns
    /// - `Ok(())` - The run succeeded, or failed under [`ErrorPolicy::Log`]
    /// - `Err(AppError)` - The run failed or panicked under [`ErrorPolicy::Propagate`]
    pub async fn run_once(&self) -> Result<(), AppError> {
        tracing::debug!("Running task {}", self.name());

        match run_guarded(self.name(), self.task.work()).await {
            Ok(()) => Ok(()),
            Err(e) => match self.policy {
                ErrorPolicy::Log => {
                    tracing::error!("Task {} failed: {}", self.name(), e);
                    Ok(())
                }
                ErrorPolicy::Propagate => Err(e),
            },
        }
    }

    /// Runs the task once per received tick until the tick channel closes.
    ///
    /// Ticks arriving while a run is in progress are held by the channel, so
    /// runs never overlap.
    pub async fn run_on_ticks(&self, mut ticks: mpsc::Receiver<()>) -> Result<(), AppError> {
        while ticks.recv().await.is_some() {
            self.run_once().await?;
        }
        Ok(())
    }

    /// Runs the task, sleeps, and repeats forever.
    pub async fn run_interval(&self, sleep: SleepSpec) -> Result<(), AppError> {
        loop {
            self.run_once().await?;
            tokio::time::sleep(sleep.next_delay()).await;
        }
    }

    /// Waits for the bot to be ready, then runs the task on its schedule.
    ///
    /// Only returns under [`ErrorPolicy::Propagate`], or if the runner's cron
    /// scheduler stops delivering ticks.
    pub async fn start(self, runner: &TaskRunner) -> Result<(), AppError> {
        runner.ready().wait().await;
        tracing::info!("Starting task {}", self.name());

        match &self.schedule {
            Schedule::Interval(sleep) => self.run_interval(*sleep).await,
            Schedule::Cron(cron) => self.run_cron(cron, runner).await,
        }
    }

    async fn run_cron(&self, cron: &CronSchedule, runner: &TaskRunner) -> Result<(), AppError> {
        let (ticks_tx, ticks_rx) = mpsc::channel(1);
        let name = self.name().to_string();

        let job = Job::new_async_tz(
            cron.normalized_expression().as_str(),
            cron.timezone,
            move |_uuid, _lock| {
                let ticks_tx = ticks_tx.clone();
                let name = name.clone();

                Box::pin(async move {
                    if ticks_tx.try_send(()).is_err() {
                        tracing::debug!("Task {} is still running, skipping tick", name);
                    }
                })
            },
        )?;
        let job_id = runner.scheduler().add(job).await?;

        let result = async {
            if cron.run_on_start {
                self.run_once().await?;
            }
            self.run_on_ticks(ticks_rx).await
        }
        .await;

        if let Err(e) = runner.scheduler().remove(&job_id).await {
            tracing::warn!("Failed to remove cron job for task {}: {}", self.name(), e);
        }

        result
    }
}
