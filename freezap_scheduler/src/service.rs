//! Seams to the OS scheduling services. Registrations made through them fire
//! outside of any UI context.

use std::sync::Arc;

use async_trait::async_trait;
use freezap_models::schedule::{AlarmSpec, JobInfo, ScheduleId};

use crate::ScheduleError;

/// Fixed target woken up by a repeating alarm.
#[async_trait]
pub trait AlarmReceiver: Send + Sync + 'static {
    async fn on_receive(&self, id: ScheduleId);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct JobParameters {
    pub job_id: ScheduleId,
}

/// Service started by the job scheduler. Returns whether the job succeeded.
#[async_trait]
pub trait JobTarget: Send + Sync + 'static {
    async fn on_start_job(&self, params: JobParameters) -> bool;
}

pub trait AlarmService: Send + Sync {
    /// Registering an id that is already armed replaces the previous registration.
    fn set_repeating(
        &self,
        id: ScheduleId,
        spec: AlarmSpec,
        receiver: Arc<dyn AlarmReceiver>,
    ) -> Result<(), ScheduleError>;

    fn cancel(&self, id: ScheduleId);

    fn is_armed(&self, id: ScheduleId) -> bool;
}

pub trait JobService: Send + Sync {
    /// Scheduling an id that is already registered replaces the previous job.
    fn schedule(&self, job: JobInfo, target: Arc<dyn JobTarget>) -> Result<(), ScheduleError>;

    fn cancel(&self, id: ScheduleId);

    fn is_scheduled(&self, id: ScheduleId) -> bool;
}

/// Looks up OS services; `None` means the service could not be obtained.
pub trait SystemServices: Send + Sync {
    fn alarm_service(&self) -> Option<Arc<dyn AlarmService>>;

    fn job_service(&self) -> Option<Arc<dyn JobService>>;
}
