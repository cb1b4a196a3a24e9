use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
    time::Duration,
};

use freezap_models::work::WorkResult;
use tokio::sync::mpsc;

use crate::{SharedWorkUnit, TaskObserver};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverEvent {
    BeforeStart,
    WorkUnit,
    AfterFinish(WorkResult),
}

impl ObserverEvent {
    pub fn is_after_finish(&self) -> bool {
        matches!(self, ObserverEvent::AfterFinish(_))
    }
}

/// Records every callback together with the thread it arrived on.
pub struct RecordingObserver {
    events: Mutex<Vec<(ObserverEvent, ThreadId)>>,
    tx: mpsc::UnboundedSender<ObserverEvent>,
}

impl RecordingObserver {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = Arc::new(Self {
            events: Mutex::new(vec![]),
            tx,
        });

        (observer, rx)
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }

    pub fn threads_of(&self, predicate: impl Fn(&ObserverEvent) -> bool) -> Vec<ThreadId> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| predicate(e))
            .map(|(_, t)| *t)
            .collect()
    }

    fn record(&self, event: ObserverEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event, thread::current().id()));
        let _ = self.tx.send(event);
    }
}

impl TaskObserver for RecordingObserver {
    fn on_before_start(&self) {
        self.record(ObserverEvent::BeforeStart);
    }

    fn on_work_unit(&self) {
        self.record(ObserverEvent::WorkUnit);
    }

    fn on_after_finish(&self, result: WorkResult) {
        self.record(ObserverEvent::AfterFinish(result));
    }
}

/// Waits for the next event matching `predicate`, skipping the others.
pub async fn next_event(
    rx: &mut mpsc::UnboundedReceiver<ObserverEvent>,
    predicate: impl Fn(&ObserverEvent) -> bool,
) -> Option<ObserverEvent> {
    tokio::time::timeout(TEST_TIMEOUT, async {
        while let Some(event) = rx.recv().await {
            if predicate(&event) {
                return Some(event);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Short blocking work unit that counts its executions.
pub fn counting_work(delay: Duration) -> (SharedWorkUnit, Arc<AtomicUsize>) {
    let executions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&executions);
    let work: SharedWorkUnit = Arc::new(move || -> anyhow::Result<WorkResult> {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(delay);
        Ok(WorkResult::now())
    });

    (work, executions)
}
