use std::sync::Arc;

use freezap_scheduler::DeferredScheduleRegistrar;
use freezap_worker::{LifecycleTaskHost, MainThreadHandle, SharedWorkUnit};
use tokio::runtime;

use crate::appsettings::AppSettings;

/// Process-wide components shared by every screen instance. Outlives any single
/// UI context.
pub struct AppContext {
    pub runtime: runtime::Handle,
    pub main: MainThreadHandle,
    pub work: SharedWorkUnit,
    pub tasks: LifecycleTaskHost,
    pub registrar: DeferredScheduleRegistrar,
    pub settings: AppSettings,
}

impl AppContext {
    pub fn new(
        runtime: runtime::Handle,
        main: MainThreadHandle,
        work: SharedWorkUnit,
        registrar: DeferredScheduleRegistrar,
        settings: AppSettings,
    ) -> Arc<Self> {
        let tasks = LifecycleTaskHost::new(runtime.clone(), main.clone(), Arc::clone(&work));

        Arc::new(Self {
            runtime,
            main,
            work,
            tasks,
            registrar,
            settings,
        })
    }
}
