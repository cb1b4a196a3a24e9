use std::sync::Arc;

use freezap_models::schedule::{AlarmSpec, ScheduleId};
use tokio::{
    runtime,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{ScheduledTask, ScheduledTaskStore};
use crate::{AlarmReceiver, AlarmService, ScheduleError};

/// Repeating elapsed-realtime alarms. The clock starts when the service is created,
/// standing in for the device boot time.
pub struct SimulatedAlarmService {
    runtime: runtime::Handle,
    boot: Instant,
    alarms: ScheduledTaskStore,
}

impl SimulatedAlarmService {
    pub fn new(runtime: runtime::Handle) -> Self {
        Self {
            runtime,
            boot: Instant::now(),
            alarms: ScheduledTaskStore::default(),
        }
    }
}

impl AlarmService for SimulatedAlarmService {
    fn set_repeating(
        &self,
        id: ScheduleId,
        spec: AlarmSpec,
        receiver: Arc<dyn AlarmReceiver>,
    ) -> Result<(), ScheduleError> {
        if spec.interval.is_zero() {
            return Err(ScheduleError::Rejected {
                id,
                reason: "repeat interval must be positive".to_owned(),
            });
        }

        let first_trigger = (self.boot + spec.trigger_at_elapsed).max(Instant::now());
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();

        let task_handle = self.runtime.spawn(async move {
            let mut ticker = time::interval_at(first_trigger, spec.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancellation_token.cancelled() => {
                        log::debug!("[ALARM] Cancelled. [alarm_id = {id}]");
                        break;
                    }
                    _ = ticker.tick() => {
                        log::info!("[ALARM] Fired. [alarm_id = {id}, wakeup = {}]", spec.wakeup);
                        receiver.on_receive(id).await;
                    }
                }
            }
        });

        let replaced = self
            .alarms
            .replace(id, ScheduledTask::new(task_handle, cancellation_token));
        log::info!(
            "[ALARM] Armed. [alarm_id = {id}, interval = {:?}, replaced = {replaced}]",
            spec.interval
        );

        Ok(())
    }

    fn cancel(&self, id: ScheduleId) {
        if self.alarms.remove(id) {
            log::info!("[ALARM] Disarmed. [alarm_id = {id}]");
        }
    }

    fn is_armed(&self, id: ScheduleId) -> bool {
        self.alarms.is_active(id)
    }
}
