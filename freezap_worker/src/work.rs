use std::{sync::Arc, thread, time::Duration};

use freezap_models::work::WorkResult;

/// A blocking unit of work. Always executed off the main thread, except for the
/// deliberate "run on main thread" demonstration.
pub trait WorkUnit: Send + Sync + 'static {
    fn execute(&self) -> anyhow::Result<WorkResult>;
}

pub type SharedWorkUnit = Arc<dyn WorkUnit>;

impl<F> WorkUnit for F
where
    F: Fn() -> anyhow::Result<WorkResult> + Send + Sync + 'static,
{
    fn execute(&self) -> anyhow::Result<WorkResult> {
        self()
    }
}

/// Blocks the calling thread for a fixed duration and reports when it finished.
#[derive(Debug, Clone)]
pub struct LongAction {
    duration: Duration,
}

impl LongAction {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl WorkUnit for LongAction {
    fn execute(&self) -> anyhow::Result<WorkResult> {
        log::debug!(
            "Long action started [thread = {:?}, duration = {:?}]",
            thread::current().name(),
            self.duration
        );
        thread::sleep(self.duration);

        Ok(WorkResult::now())
    }
}
