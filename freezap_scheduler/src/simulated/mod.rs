//! In-process stand-ins for the OS alarm and job services, driven by tokio timers.

mod alarm;
mod job;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use freezap_models::schedule::ScheduleId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use alarm::SimulatedAlarmService;
pub use job::{MIN_PERIOD, SimulatedJobService};

use crate::{AlarmService, JobService, SystemServices};

struct ScheduledTask {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ScheduledTask {
    fn new(task_handle: JoinHandle<()>, cancellation_token: CancellationToken) -> Self {
        Self {
            task_handle,
            cancellation_token,
        }
    }

    fn cancel(self) {
        self.cancellation_token.cancel();
    }

    fn is_active(&self) -> bool {
        !self.cancellation_token.is_cancelled() && !self.task_handle.is_finished()
    }
}

#[derive(Default)]
struct ScheduledTaskStore(Mutex<HashMap<ScheduleId, ScheduledTask>>);

impl ScheduledTaskStore {
    fn lock(&self) -> MutexGuard<'_, HashMap<ScheduleId, ScheduledTask>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `task`, cancelling whatever was registered under `id` before.
    fn replace(&self, id: ScheduleId, task: ScheduledTask) -> bool {
        let previous = self.lock().insert(id, task);
        match previous {
            Some(previous) => {
                previous.cancel();
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: ScheduleId) -> bool {
        let removed = self.lock().remove(&id);
        match removed {
            Some(task) => {
                task.cancel();
                true
            }
            None => false,
        }
    }

    fn is_active(&self, id: ScheduleId) -> bool {
        self.lock().get(&id).is_some_and(ScheduledTask::is_active)
    }
}

impl Drop for ScheduledTaskStore {
    fn drop(&mut self) {
        for (_, task) in self.lock().drain() {
            task.cancel();
        }
    }
}

/// Device state consulted before a constrained job runs.
pub trait DeviceConditions: Send + Sync + 'static {
    fn is_charging(&self) -> bool;

    fn has_network(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct SimulatedDevice {
    charging: AtomicBool,
    network: AtomicBool,
}

impl SimulatedDevice {
    pub fn new(charging: bool, network: bool) -> Self {
        Self {
            charging: AtomicBool::new(charging),
            network: AtomicBool::new(network),
        }
    }

    pub fn set_charging(&self, charging: bool) {
        self.charging.store(charging, Ordering::SeqCst);
    }

    pub fn set_network(&self, network: bool) {
        self.network.store(network, Ordering::SeqCst);
    }
}

impl DeviceConditions for SimulatedDevice {
    fn is_charging(&self) -> bool {
        self.charging.load(Ordering::SeqCst)
    }

    fn has_network(&self) -> bool {
        self.network.load(Ordering::SeqCst)
    }
}

/// Service locator over the simulated services. Either may be left out to
/// model a device where it cannot be obtained.
#[derive(Default)]
pub struct SimulatedSystemServices {
    alarm: Option<Arc<SimulatedAlarmService>>,
    job: Option<Arc<SimulatedJobService>>,
}

impl SimulatedSystemServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alarm_service(mut self, service: Arc<SimulatedAlarmService>) -> Self {
        self.alarm = Some(service);
        self
    }

    pub fn with_job_service(mut self, service: Arc<SimulatedJobService>) -> Self {
        self.job = Some(service);
        self
    }
}

impl SystemServices for SimulatedSystemServices {
    fn alarm_service(&self) -> Option<Arc<dyn AlarmService>> {
        self.alarm
            .clone()
            .map(|service| service as Arc<dyn AlarmService>)
    }

    fn job_service(&self) -> Option<Arc<dyn JobService>> {
        self.job.clone().map(|service| service as Arc<dyn JobService>)
    }
}
