mod background_worker;
mod error;
mod handler_thread;
mod lifecycle_host;
mod main_thread;
mod observer;
mod work;

#[cfg(test)]
mod test_utils;

pub use background_worker::{BackgroundWorker, StartPolicy};
pub use error::WorkerError;
pub use handler_thread::HandlerThread;
pub use lifecycle_host::{LifecycleTaskHost, TaskHandle, TaskState};
pub use main_thread::{MainThread, MainThreadHandle};
pub use observer::{ObserverRef, TaskObserver};
pub use work::{LongAction, SharedWorkUnit, WorkUnit};
