use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use async_trait::async_trait;
use freezap_models::{schedule::ScheduleId, work::WorkResult};
use freezap_scheduler::{AlarmReceiver, JobParameters, JobTarget};
use freezap_worker::SharedWorkUnit;
use tokio::sync::mpsc;

use crate::ui::UiFeedback;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    Busy(bool),
    Message(String),
}

/// Captures what a screen shows, in order.
pub struct RecordingFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
    tx: mpsc::UnboundedSender<FeedbackEvent>,
}

impl RecordingFeedback {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FeedbackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let feedback = Arc::new(Self {
            events: Mutex::new(vec![]),
            tx,
        });

        (feedback, rx)
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FeedbackEvent::Message(message) => Some(message),
                FeedbackEvent::Busy(_) => None,
            })
            .collect()
    }

    fn record(&self, event: FeedbackEvent) {
        self.events.lock().unwrap().push(event.clone());
        let _ = self.tx.send(event);
    }
}

impl UiFeedback for RecordingFeedback {
    fn set_busy(&self, busy: bool) {
        self.record(FeedbackEvent::Busy(busy));
    }

    fn show_message(&self, message: &str) {
        self.record(FeedbackEvent::Message(message.to_owned()));
    }
}

/// Waits for the next event matching `predicate`, skipping the others.
pub async fn next_feedback(
    rx: &mut mpsc::UnboundedReceiver<FeedbackEvent>,
    predicate: impl Fn(&FeedbackEvent) -> bool,
) -> Option<FeedbackEvent> {
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

pub fn is_result_message(event: &FeedbackEvent) -> bool {
    matches!(event, FeedbackEvent::Message(message) if message.starts_with("Task is finally finished at"))
}

#[derive(Clone, Default)]
pub struct ExecutionCounter(Arc<AtomicUsize>);

impl ExecutionCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Blocking work unit that sleeps for `delay` and counts its executions.
pub fn counting_work(delay: Duration) -> (SharedWorkUnit, ExecutionCounter) {
    let counter = ExecutionCounter::default();
    let work_counter = counter.clone();
    let work: SharedWorkUnit = Arc::new(move || -> anyhow::Result<WorkResult> {
        work_counter.increment();
        thread::sleep(delay);
        Ok(WorkResult::now())
    });

    (work, counter)
}

/// Alarm receiver and job target that only count how often they were woken up.
#[derive(Clone, Default)]
pub struct CountingReceiver {
    pub alarms: ExecutionCounter,
    pub jobs: ExecutionCounter,
}

#[async_trait]
impl AlarmReceiver for CountingReceiver {
    async fn on_receive(&self, _id: ScheduleId) {
        self.alarms.increment();
    }
}

#[async_trait]
impl JobTarget for CountingReceiver {
    async fn on_start_job(&self, _params: JobParameters) -> bool {
        self.jobs.increment();
        true
    }
}
