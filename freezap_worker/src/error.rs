use freezap_models::work::TaskId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("A background task is already running")]
    AlreadyRunning,

    #[error("Main thread is no longer accepting jobs")]
    MainThreadClosed,

    #[error("Handler thread {0} has quit")]
    ThreadQuit(String),

    #[error("Task {0} was reset before it finished")]
    TaskDiscarded(TaskId),
}
