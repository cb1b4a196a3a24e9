use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use serde::Deserialize;
use tokio::{runtime, task};

use crate::{MainThreadHandle, ObserverRef, SharedWorkUnit, WorkerError};

/// What `start` does while a previous execution is still in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    #[default]
    RejectWhileRunning,
    /// Every call starts its own execution, with no ordering between them.
    Independent,
}

/// Fire-and-forget one-shot task. An execution cannot be cancelled once started.
pub struct BackgroundWorker {
    runtime: runtime::Handle,
    main: MainThreadHandle,
    work: SharedWorkUnit,
    policy: StartPolicy,
    in_flight: Arc<AtomicUsize>,
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BackgroundWorker {
    pub fn new(
        runtime: runtime::Handle,
        main: MainThreadHandle,
        work: SharedWorkUnit,
        policy: StartPolicy,
    ) -> Self {
        Self {
            runtime,
            main,
            work,
            policy,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn start(&self, observer: ObserverRef) -> Result<(), WorkerError> {
        match self.policy {
            StartPolicy::RejectWhileRunning => {
                if self
                    .in_flight
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    log::warn!("Rejected start, a background task is already running");
                    return Err(WorkerError::AlreadyRunning);
                }
            }
            StartPolicy::Independent => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
            }
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let main = self.main.clone();
        let work = Arc::clone(&self.work);
        self.runtime
            .spawn(async move { run_task(main, work, observer, guard).await });

        Ok(())
    }
}

async fn run_task(
    main: MainThreadHandle,
    work: SharedWorkUnit,
    observer: ObserverRef,
    guard: InFlightGuard,
) {
    let before = observer.clone();
    if main
        .run(move || {
            before.notify(|o| o.on_before_start());
        })
        .await
        .is_err()
    {
        log::warn!("Main thread closed before the background task started");
        return;
    }

    log::info!("Background task is started.");
    let background_observer = observer.clone();
    let result = task::spawn_blocking(move || {
        background_observer.notify(|o| o.on_work_unit());
        log::info!("Background task doing some big work...");
        work.execute()
    })
    .await;

    match result {
        Ok(Ok(result)) => {
            // The worker stays busy until the result has reached the observer.
            let posted = main.post(move || {
                observer.notify(|o| o.on_after_finish(result));
                drop(guard);
            });
            if posted.is_err() {
                log::warn!("Main thread closed, dropping result [result = {result}]");
                return;
            }
            log::info!("Background task is finished. [result = {result}]");
        }
        Ok(Err(error)) => {
            drop(guard);
            log::error!("Background task failed [error = {error:#}]");
        }
        Err(error) => {
            drop(guard);
            log::error!("Background task panicked [error = {error}]");
        }
    }
}
