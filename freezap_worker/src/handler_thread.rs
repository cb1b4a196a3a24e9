use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use tokio::sync::mpsc;

use crate::{MainThreadHandle, ObserverRef, SharedWorkUnit, WorkerError};

/// Dedicated worker thread owned by one UI context. Work posted to it runs
/// sequentially; the observer is notified on the main thread around each run.
pub struct HandlerThread {
    name: String,
    tx: Option<mpsc::UnboundedSender<()>>,
    quitting: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl HandlerThread {
    pub fn start(
        name: &str,
        main: MainThreadHandle,
        work: SharedWorkUnit,
        observer: ObserverRef,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let quitting = Arc::new(AtomicBool::new(false));
        let loop_quitting = Arc::clone(&quitting);
        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run_loop(rx, loop_quitting, main, work, observer))?;

        log::info!("Handler thread started [name = {name}]");

        Ok(Self {
            name: name.to_owned(),
            tx: Some(tx),
            quitting,
            thread: Some(thread),
        })
    }

    /// Queues one execution of the work unit.
    pub fn start_handler(&self) -> Result<(), WorkerError> {
        self.tx
            .as_ref()
            .and_then(|tx| tx.send(()).ok())
            .ok_or_else(|| WorkerError::ThreadQuit(self.name.clone()))
    }

    /// Stops the thread. Queued runs are dropped, a run in progress completes.
    pub fn quit(&mut self) -> bool {
        self.quitting.store(true, Ordering::SeqCst);
        let was_running = self.tx.take().is_some();
        if was_running {
            log::info!("Handler thread quitting [name = {}]", self.name);
        }
        was_running
    }

    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }
}

impl Drop for HandlerThread {
    fn drop(&mut self) {
        self.quit();
    }
}

fn run_loop(
    mut rx: mpsc::UnboundedReceiver<()>,
    quitting: Arc<AtomicBool>,
    main: MainThreadHandle,
    work: SharedWorkUnit,
    observer: ObserverRef,
) {
    while rx.blocking_recv().is_some() {
        if quitting.load(Ordering::SeqCst) {
            break;
        }

        let before = observer.clone();
        if main
            .post(move || {
                before.notify(|o| o.on_before_start());
            })
            .is_err()
        {
            break;
        }

        observer.notify(|o| o.on_work_unit());
        match work.execute() {
            Ok(result) => {
                let after = observer.clone();
                if main
                    .post(move || {
                        after.notify(|o| o.on_after_finish(result));
                    })
                    .is_err()
                {
                    break;
                }
            }
            Err(error) => log::error!("Handler thread work failed [error = {error:#}]"),
        }
    }
    log::debug!("Handler thread loop stopped");
}
