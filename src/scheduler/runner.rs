use tokio::task::JoinHandle;
use tokio_cron_scheduler::JobScheduler;

use crate::{discord::ready::ReadyGate, error::AppError, scheduler::periodic::PeriodicTask};

/// Owns the cron scheduler and starts periodic tasks once the bot is ready.
#[derive(Clone)]
pub struct TaskRunner {
    scheduler: JobScheduler,
    ready: ReadyGate,
}

impl TaskRunner {
    /// Creates and starts the underlying cron scheduler.
    pub async fn new(ready: ReadyGate) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;

        tracing::info!("Task scheduler started");

        Ok(Self { scheduler, ready })
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    pub fn ready(&self) -> &ReadyGate {
        &self.ready
    }

    /// Runs `task` in its own tokio task.
    ///
    /// A task that stops (only possible with the propagate policy) is logged
    /// here; it never takes the process down.
    pub fn spawn(&self, task: PeriodicTask) -> JoinHandle<()> {
        let runner = self.clone();

        tokio::spawn(async move {
            let name = task.name().to_string();
            if let Err(e) = task.start(&runner).await {
                tracing::error!("Task {} stopped: {}", name, e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        discord::ready::BotUser,
        scheduler::{schedule::CronSchedule, Task},
    };
    use serenity::all::UserId;
    use serenity::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingTask {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Task for CountingTask {
        fn name(&self) -> &str {
            "counting"
        }

        async fn work(&self) -> Result<(), AppError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Tests that a cron task waits for the ready gate and then follows its schedule.
    ///
    /// Uses a per-second cron with run_on_start and real time.
    ///
    /// Expected: no runs before the gate opens; the start run plus at least one
    /// tick within 2.5 seconds after
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cron_task_starts_after_ready() -> Result<(), AppError> {
        let ready = ReadyGate::new();
        let runner = TaskRunner::new(ready.clone()).await?;
        let task = Arc::new(CountingTask {
            runs: AtomicUsize::new(0),
        });

        let schedule = CronSchedule::new("* * * * * *", chrono_tz::Tz::UTC).run_on_start();
        let handle = runner.spawn(PeriodicTask::cron(task.clone(), schedule));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(task.runs.load(Ordering::SeqCst), 0);

        ready.open(BotUser {
            id: UserId::new(1),
            name: "homebot".to_string(),
        });
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(task.runs.load(Ordering::SeqCst) >= 2);
        handle.abort();

        Ok(())
    }
}
