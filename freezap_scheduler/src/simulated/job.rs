use std::{sync::Arc, time::Duration};

use freezap_models::schedule::{JobInfo, ScheduleId};
use tokio::{
    runtime,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{DeviceConditions, ScheduledTask, ScheduledTaskStore};
use crate::{JobParameters, JobService, JobTarget, ScheduleError};

/// Shortest period the job scheduler honours; shorter periods are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Periodic jobs gated by device conditions. A period whose constraints are not
/// met is skipped; the job runs again at the next period.
pub struct SimulatedJobService {
    runtime: runtime::Handle,
    device: Arc<dyn DeviceConditions>,
    jobs: ScheduledTaskStore,
}

impl SimulatedJobService {
    pub fn new(runtime: runtime::Handle, device: Arc<dyn DeviceConditions>) -> Self {
        Self {
            runtime,
            device,
            jobs: ScheduledTaskStore::default(),
        }
    }
}

impl JobService for SimulatedJobService {
    fn schedule(&self, job: JobInfo, target: Arc<dyn JobTarget>) -> Result<(), ScheduleError> {
        if job.period.is_zero() {
            return Err(ScheduleError::Rejected {
                id: job.id,
                reason: "period must be positive".to_owned(),
            });
        }

        let period = job.period.max(MIN_PERIOD);
        if period != job.period {
            log::warn!(
                "[JOB] Period raised to minimum. [job_id = {}, requested = {:?}, period = {:?}]",
                job.id,
                job.period,
                period
            );
        }

        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let device = Arc::clone(&self.device);
        let id = job.id;
        let constraints = job.constraints;

        let task_handle = self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancellation_token.cancelled() => {
                        log::debug!("[JOB] Cancelled. [job_id = {id}]");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !constraints.is_satisfied_by(device.is_charging(), device.has_network()) {
                            log::debug!("[JOB] Constraints not met, skipping. [job_id = {id}, constraints = {constraints:?}]");
                            continue;
                        }
                        let succeeded = target.on_start_job(JobParameters { job_id: id }).await;
                        log::info!("[JOB] Ran. [job_id = {id}, succeeded = {succeeded}]");
                    }
                }
            }
        });

        let replaced = self
            .jobs
            .replace(id, ScheduledTask::new(task_handle, cancellation_token));
        log::info!("[JOB] Scheduled. [job_id = {id}, period = {period:?}, replaced = {replaced}]");

        Ok(())
    }

    fn cancel(&self, id: ScheduleId) {
        if self.jobs.remove(id) {
            log::info!("[JOB] Cancelled. [job_id = {id}]");
        }
    }

    fn is_scheduled(&self, id: ScheduleId) -> bool {
        self.jobs.is_active(id)
    }
}
