//! Process-wide registry of background executions that outlive the UI context
//! which started them.
//!
//! A context attaches to a task by id and detaches when it is torn down. The
//! execution keeps running without an observer; its result is delivered exactly
//! once, to whichever observer is attached when it becomes available.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use freezap_models::work::{TaskId, WorkResult};
use tokio::{runtime, sync::watch, task};

use crate::{MainThreadHandle, ObserverRef, SharedWorkUnit, WorkerError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Finished(WorkResult),
}

struct HostedTask {
    generation: u64,
    observer: Option<ObserverRef>,
    state: watch::Sender<TaskState>,
    delivered: bool,
}

impl HostedTask {
    fn current_state(&self) -> TaskState {
        *self.state.borrow()
    }
}

#[derive(Default)]
struct TaskRegistry {
    tasks: HashMap<TaskId, HostedTask>,
    next_generation: u64,
}

struct HostInner {
    runtime: runtime::Handle,
    main: MainThreadHandle,
    work: SharedWorkUnit,
    registry: Mutex<TaskRegistry>,
}

#[derive(Clone)]
pub struct LifecycleTaskHost {
    inner: Arc<HostInner>,
}

/// Read-only view of a hosted task.
pub struct TaskHandle {
    id: TaskId,
    state: watch::Receiver<TaskState>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TaskState::Running
    }

    /// Resolves with the result, or fails if the task was reset first.
    pub async fn wait(&mut self) -> Result<WorkResult, WorkerError> {
        let state = self
            .state
            .wait_for(|s| matches!(s, TaskState::Finished(_)))
            .await
            .map_err(|_| WorkerError::TaskDiscarded(self.id))?;

        match *state {
            TaskState::Finished(result) => Ok(result),
            TaskState::Running => Err(WorkerError::TaskDiscarded(self.id)),
        }
    }
}

enum AttachOutcome {
    Running(TaskHandle),
    Pending(TaskHandle, u64),
    Vacant,
}

impl LifecycleTaskHost {
    pub fn new(runtime: runtime::Handle, main: MainThreadHandle, work: SharedWorkUnit) -> Self {
        Self {
            inner: Arc::new(HostInner {
                runtime,
                main,
                work,
                registry: Mutex::new(TaskRegistry::default()),
            }),
        }
    }

    /// Attaches `observer` to the task `id`, starting a new execution unless one
    /// is running or holds a result that was never delivered.
    pub fn attach_or_create(&self, id: TaskId, observer: ObserverRef) -> TaskHandle {
        let mut registry = self.registry();
        match Self::attach(&mut registry, id, &observer) {
            AttachOutcome::Running(handle) => {
                drop(registry);
                log::info!("Re-attached to running task [task_id = {id}]");
                self.post_before_start(observer);
                handle
            }
            AttachOutcome::Pending(handle, generation) => {
                drop(registry);
                log::info!("Re-attached to finished task [task_id = {id}]");
                self.deliver(id, generation);
                handle
            }
            AttachOutcome::Vacant => self.create(&mut registry, id, observer),
        }
    }

    /// Attaches `observer` only if task `id` still has something to report.
    pub fn resume(&self, id: TaskId, observer: ObserverRef) -> Option<TaskHandle> {
        let mut registry = self.registry();
        match Self::attach(&mut registry, id, &observer) {
            AttachOutcome::Running(handle) => {
                drop(registry);
                log::info!("Resumed running task [task_id = {id}]");
                self.post_before_start(observer);
                Some(handle)
            }
            AttachOutcome::Pending(handle, generation) => {
                drop(registry);
                log::info!("Resumed finished task [task_id = {id}]");
                self.deliver(id, generation);
                Some(handle)
            }
            AttachOutcome::Vacant => None,
        }
    }

    /// Unhooks `observer` from task `id` if it is the one attached. The
    /// execution itself is untouched.
    pub fn detach(&self, id: TaskId, observer: &ObserverRef) {
        let mut registry = self.registry();
        let Some(task) = registry.tasks.get_mut(&id) else {
            return;
        };

        if task
            .observer
            .as_ref()
            .is_some_and(|attached| attached.is_same(observer))
        {
            task.observer = None;
            log::debug!("Detached observer [task_id = {id}]");
        } else {
            log::debug!("Observer already replaced, nothing to detach [task_id = {id}]");
        }
    }

    /// Discards task `id`. A still running execution completes in the background
    /// and its result is thrown away.
    pub fn reset(&self, id: TaskId) {
        if let Some(task) = self.registry().tasks.remove(&id) {
            log::info!(
                "Reset task [task_id = {id}, state = {:?}]",
                task.current_state()
            );
        }
    }

    pub fn handle(&self, id: TaskId) -> Option<TaskHandle> {
        self.registry().tasks.get(&id).map(|task| TaskHandle {
            id,
            state: task.state.subscribe(),
        })
    }

    fn registry(&self) -> MutexGuard<'_, TaskRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn attach(registry: &mut TaskRegistry, id: TaskId, observer: &ObserverRef) -> AttachOutcome {
        let Some(task) = registry.tasks.get_mut(&id) else {
            return AttachOutcome::Vacant;
        };

        let outcome = match task.current_state() {
            TaskState::Running => AttachOutcome::Running(TaskHandle {
                id,
                state: task.state.subscribe(),
            }),
            TaskState::Finished(_) if !task.delivered => AttachOutcome::Pending(
                TaskHandle {
                    id,
                    state: task.state.subscribe(),
                },
                task.generation,
            ),
            TaskState::Finished(_) => return AttachOutcome::Vacant,
        };

        task.observer = Some(observer.clone());
        outcome
    }

    fn create(
        &self,
        registry: &mut MutexGuard<'_, TaskRegistry>,
        id: TaskId,
        observer: ObserverRef,
    ) -> TaskHandle {
        let generation = registry.next_generation;
        registry.next_generation += 1;

        let (state, state_rx) = watch::channel(TaskState::Running);
        registry.tasks.insert(
            id,
            HostedTask {
                generation,
                observer: Some(observer.clone()),
                state,
                delivered: false,
            },
        );
        log::info!("Created task [task_id = {id}, generation = {generation}]");

        let host = self.clone();
        self.inner
            .runtime
            .spawn(async move { host.execute(id, generation, observer).await });

        TaskHandle {
            id,
            state: state_rx,
        }
    }

    async fn execute(self, id: TaskId, generation: u64, observer: ObserverRef) {
        let before = observer.clone();
        if self
            .inner
            .main
            .run(move || {
                before.notify(|o| o.on_before_start());
            })
            .await
            .is_err()
        {
            log::warn!("Main thread closed before task started [task_id = {id}]");
            return;
        }

        let work = Arc::clone(&self.inner.work);
        let result = task::spawn_blocking(move || work.execute()).await;

        match result {
            Ok(Ok(result)) => self.complete(id, generation, result),
            Ok(Err(error)) => {
                log::error!("Task failed [task_id = {id}, error = {error:#}]");
                self.discard(id, generation);
            }
            Err(error) => {
                log::error!("Task panicked [task_id = {id}, error = {error}]");
                self.discard(id, generation);
            }
        }
    }

    fn complete(&self, id: TaskId, generation: u64, result: WorkResult) {
        {
            let mut registry = self.registry();
            match registry.tasks.get_mut(&id) {
                Some(task) if task.generation == generation => {
                    task.state.send_replace(TaskState::Finished(result));
                }
                _ => {
                    log::info!("Discarding result of reset task [task_id = {id}, result = {result}]");
                    return;
                }
            }
        }

        log::info!("Task finished [task_id = {id}, result = {result}]");
        self.deliver(id, generation);
    }

    fn discard(&self, id: TaskId, generation: u64) {
        let mut registry = self.registry();
        if registry
            .tasks
            .get(&id)
            .is_some_and(|task| task.generation == generation)
        {
            registry.tasks.remove(&id);
        }
    }

    fn post_before_start(&self, observer: ObserverRef) {
        let posted = self.inner.main.post(move || {
            observer.notify(|o| o.on_before_start());
        });
        if posted.is_err() {
            log::warn!("Main thread closed, before-start not delivered");
        }
    }

    /// Hands the result to the attached observer on the main thread. The result
    /// stays pending when nobody is attached.
    fn deliver(&self, id: TaskId, generation: u64) {
        let host = self.clone();
        let posted = self.inner.main.post(move || {
            let target = {
                let mut registry = host.registry();
                let Some(task) = registry
                    .tasks
                    .get_mut(&id)
                    .filter(|task| task.generation == generation && !task.delivered)
                else {
                    return;
                };
                let TaskState::Finished(result) = task.current_state() else {
                    return;
                };
                let Some(observer) = task.observer.as_ref().and_then(ObserverRef::upgrade) else {
                    log::debug!("No observer attached, result kept pending [task_id = {id}]");
                    return;
                };
                task.delivered = true;
                (observer, result)
            };

            let (observer, result) = target;
            observer.on_after_finish(result);
        });

        if posted.is_err() {
            log::warn!("Main thread closed, result not delivered [task_id = {id}]");
        }
    }
}
