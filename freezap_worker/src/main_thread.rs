use std::{
    io,
    panic::{AssertUnwindSafe, catch_unwind},
    thread::{self, JoinHandle, ThreadId},
};

use tokio::sync::{mpsc, oneshot};

use crate::WorkerError;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum MainThreadMessage {
    Run(Job),
    Quit,
}

/// Single thread that owns every UI mutation. Jobs run one at a time in the
/// order they were posted.
pub struct MainThread {
    handle: MainThreadHandle,
    thread: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct MainThreadHandle {
    tx: mpsc::UnboundedSender<MainThreadMessage>,
    thread_id: ThreadId,
}

impl MainThread {
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let thread = thread::Builder::new()
            .name("main".to_owned())
            .spawn(move || run_loop(rx))?;

        let handle = MainThreadHandle {
            tx,
            thread_id: thread.thread().id(),
        };

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> MainThreadHandle {
        self.handle.clone()
    }

    /// Stops the loop once the already queued jobs have run.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.handle.tx.send(MainThreadMessage::Quit);
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                log::error!("Main thread terminated with a panic");
            }
        }
    }
}

impl Drop for MainThread {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MainThreadHandle {
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> Result<(), WorkerError> {
        self.tx
            .send(MainThreadMessage::Run(Box::new(job)))
            .map_err(|_| WorkerError::MainThreadClosed)
    }

    /// Posts `job` and resolves once it has run on the main thread.
    pub async fn run<R>(&self, job: impl FnOnce() -> R + Send + 'static) -> Result<R, WorkerError>
    where
        R: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        self.post(move || {
            let _ = result_tx.send(job());
        })?;

        result_rx.await.map_err(|_| WorkerError::MainThreadClosed)
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

fn run_loop(mut rx: mpsc::UnboundedReceiver<MainThreadMessage>) {
    log::debug!("Main thread loop started");
    while let Some(message) = rx.blocking_recv() {
        match message {
            MainThreadMessage::Run(job) => {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "Unknown panic".to_owned());
                    log::error!("Main thread job panicked [panic = {msg}]");
                }
            }
            MainThreadMessage::Quit => break,
        }
    }
    log::debug!("Main thread loop stopped");
}
