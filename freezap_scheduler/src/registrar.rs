use std::{sync::Arc, time::Duration};

use freezap_models::schedule::{AlarmSpec, JobConstraints, JobInfo, ScheduleId};

use crate::{
    AlarmReceiver, AlarmService, JobService, JobTarget, ScheduleError, ServiceKind, SystemServices,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    Unregistered,
    Armed,
}

/// Arms and disarms the two OS-level schedules. Failures are returned to the
/// caller as-is; nothing is retried here.
pub struct DeferredScheduleRegistrar {
    services: Arc<dyn SystemServices>,
    alarm_receiver: Arc<dyn AlarmReceiver>,
    job_target: Arc<dyn JobTarget>,
}

impl DeferredScheduleRegistrar {
    pub fn new(
        services: Arc<dyn SystemServices>,
        alarm_receiver: Arc<dyn AlarmReceiver>,
        job_target: Arc<dyn JobTarget>,
    ) -> Self {
        Self {
            services,
            alarm_receiver,
            job_target,
        }
    }

    pub fn arm_repeating_alarm(
        &self,
        id: ScheduleId,
        interval: Duration,
    ) -> Result<(), ScheduleError> {
        let service = self.alarm_service()?;
        service.set_repeating(
            id,
            AlarmSpec::repeating(interval),
            Arc::clone(&self.alarm_receiver),
        )
    }

    pub fn cancel_repeating_alarm(&self, id: ScheduleId) -> Result<(), ScheduleError> {
        self.alarm_service()?.cancel(id);
        Ok(())
    }

    pub fn arm_periodic_job(
        &self,
        id: ScheduleId,
        interval: Duration,
        constraints: JobConstraints,
    ) -> Result<(), ScheduleError> {
        let service = self.job_service()?;
        let job = JobInfo {
            id,
            period: interval,
            constraints,
        };
        service.schedule(job, Arc::clone(&self.job_target))
    }

    pub fn cancel_periodic_job(&self, id: ScheduleId) -> Result<(), ScheduleError> {
        self.job_service()?.cancel(id);
        Ok(())
    }

    pub fn alarm_state(&self, id: ScheduleId) -> ScheduleState {
        let armed = self
            .services
            .alarm_service()
            .is_some_and(|service| service.is_armed(id));
        Self::state(armed)
    }

    pub fn job_state(&self, id: ScheduleId) -> ScheduleState {
        let armed = self
            .services
            .job_service()
            .is_some_and(|service| service.is_scheduled(id));
        Self::state(armed)
    }

    fn state(armed: bool) -> ScheduleState {
        if armed {
            ScheduleState::Armed
        } else {
            ScheduleState::Unregistered
        }
    }

    fn alarm_service(&self) -> Result<Arc<dyn AlarmService>, ScheduleError> {
        self.services.alarm_service().ok_or_else(|| {
            log::error!("Could not obtain the alarm service");
            ScheduleError::ServiceUnavailable(ServiceKind::Alarm)
        })
    }

    fn job_service(&self) -> Result<Arc<dyn JobService>, ScheduleError> {
        self.services.job_service().ok_or_else(|| {
            log::error!("Could not obtain the job scheduler service");
            ScheduleError::ServiceUnavailable(ServiceKind::JobScheduler)
        })
    }
}

#[cfg(test)]
mod tests;
