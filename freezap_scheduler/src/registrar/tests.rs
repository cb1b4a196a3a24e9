use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use freezap_models::schedule::NetworkType;
use proptest::prelude::*;
use test_strategy::proptest;
use tokio::runtime;

use super::*;
use crate::{
    JobParameters,
    simulated::{SimulatedAlarmService, SimulatedDevice, SimulatedJobService, SimulatedSystemServices},
};

const ALARM_ID: ScheduleId = 1;
const JOB_ID: ScheduleId = 200;
const ALARM_INTERVAL: Duration = Duration::from_millis(900_000);
const JOB_INTERVAL: Duration = Duration::from_millis(3_600_000);

type Received = Arc<Mutex<Vec<ScheduleId>>>;

struct TestAlarmReceiver {
    received: Received,
}

#[async_trait]
impl AlarmReceiver for TestAlarmReceiver {
    async fn on_receive(&self, id: ScheduleId) {
        self.received.lock().unwrap().push(id);
    }
}

struct TestJobTarget {
    received: Received,
}

#[async_trait]
impl JobTarget for TestJobTarget {
    async fn on_start_job(&self, params: JobParameters) -> bool {
        self.received.lock().unwrap().push(params.job_id);
        true
    }
}

struct TestContext {
    pub alarms: Received,
    pub jobs: Received,
    pub device: Arc<SimulatedDevice>,
    pub registrar: DeferredScheduleRegistrar,
}

impl TestContext {
    fn new() -> Self {
        let device = Arc::new(SimulatedDevice::new(true, true));
        let services = SimulatedSystemServices::new()
            .with_alarm_service(Arc::new(SimulatedAlarmService::new(
                runtime::Handle::current(),
            )))
            .with_job_service(Arc::new(SimulatedJobService::new(
                runtime::Handle::current(),
                device.clone(),
            )));

        Self::with_services(Arc::new(services), device)
    }

    fn without_services() -> Self {
        let device = Arc::new(SimulatedDevice::new(true, true));
        Self::with_services(Arc::new(SimulatedSystemServices::new()), device)
    }

    fn with_services(services: Arc<dyn SystemServices>, device: Arc<SimulatedDevice>) -> Self {
        let alarms: Received = Arc::new(Mutex::new(vec![]));
        let jobs: Received = Arc::new(Mutex::new(vec![]));
        let registrar = DeferredScheduleRegistrar::new(
            services,
            Arc::new(TestAlarmReceiver {
                received: alarms.clone(),
            }),
            Arc::new(TestJobTarget {
                received: jobs.clone(),
            }),
        );

        Self {
            alarms,
            jobs,
            device,
            registrar,
        }
    }

    fn alarm_count(&self) -> usize {
        self.alarms.lock().unwrap().len()
    }

    fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

fn job_constraints() -> JobConstraints {
    JobConstraints::new()
        .requires_charging(true)
        .required_network(NetworkType::Any)
}

async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}

fn tokio_ct(
    future: impl std::future::Future<Output = Result<(), TestCaseError>>,
) -> Result<(), TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
        .block_on(future)
}

#[tokio::test(start_paused = true)]
async fn alarm_fires_immediately_then_every_interval() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL)
        .unwrap();
    wait(ALARM_INTERVAL / 2).await;
    assert_eq!(ctx.alarm_count(), 1);

    wait(ALARM_INTERVAL).await;
    assert_eq!(ctx.alarm_count(), 2);
    assert_eq!(ctx.registrar.alarm_state(ALARM_ID), ScheduleState::Armed);
    assert!(ctx.alarms.lock().unwrap().iter().all(|id| *id == ALARM_ID));
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_the_previous_alarm() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL)
        .unwrap();
    ctx.registrar
        .arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL)
        .unwrap();
    wait(ALARM_INTERVAL * 2 + ALARM_INTERVAL / 2).await;

    assert_eq!(ctx.alarm_count(), 3);
    assert_eq!(ctx.registrar.alarm_state(ALARM_ID), ScheduleState::Armed);
}

#[tokio::test(start_paused = true)]
async fn cancelling_an_unknown_alarm_succeeds() {
    let ctx = TestContext::new();

    ctx.registrar.cancel_repeating_alarm(ALARM_ID).unwrap();
    ctx.registrar.cancel_repeating_alarm(ALARM_ID).unwrap();

    assert_eq!(
        ctx.registrar.alarm_state(ALARM_ID),
        ScheduleState::Unregistered
    );
}

#[tokio::test(start_paused = true)]
async fn alarm_cancelled_right_after_arming_never_fires() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL)
        .unwrap();
    ctx.registrar.cancel_repeating_alarm(ALARM_ID).unwrap();
    wait(ALARM_INTERVAL * 2).await;

    assert_eq!(ctx.alarm_count(), 0);
    assert_eq!(
        ctx.registrar.alarm_state(ALARM_ID),
        ScheduleState::Unregistered
    );
}

#[tokio::test(start_paused = true)]
async fn zero_interval_alarm_is_rejected() {
    let ctx = TestContext::new();

    let result = ctx.registrar.arm_repeating_alarm(ALARM_ID, Duration::ZERO);

    assert!(matches!(result, Err(ScheduleError::Rejected { id: ALARM_ID, .. })));
}

#[tokio::test(start_paused = true)]
async fn missing_services_fail_registration() {
    let ctx = TestContext::without_services();

    assert_eq!(
        ctx.registrar.arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL),
        Err(ScheduleError::ServiceUnavailable(ServiceKind::Alarm))
    );
    assert_eq!(
        ctx.registrar.cancel_repeating_alarm(ALARM_ID),
        Err(ScheduleError::ServiceUnavailable(ServiceKind::Alarm))
    );
    assert_eq!(
        ctx.registrar
            .arm_periodic_job(JOB_ID, JOB_INTERVAL, job_constraints()),
        Err(ScheduleError::ServiceUnavailable(ServiceKind::JobScheduler))
    );
    assert_eq!(
        ctx.registrar.cancel_periodic_job(JOB_ID),
        Err(ScheduleError::ServiceUnavailable(ServiceKind::JobScheduler))
    );
    assert_eq!(ctx.registrar.job_state(JOB_ID), ScheduleState::Unregistered);
}

#[tokio::test(start_paused = true)]
async fn periodic_job_runs_once_per_period() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_periodic_job(JOB_ID, JOB_INTERVAL, job_constraints())
        .unwrap();
    wait(JOB_INTERVAL / 2).await;
    assert_eq!(ctx.job_count(), 0);

    wait(JOB_INTERVAL).await;
    assert_eq!(ctx.job_count(), 1);

    wait(JOB_INTERVAL).await;
    assert_eq!(ctx.job_count(), 2);
    assert_eq!(ctx.registrar.job_state(JOB_ID), ScheduleState::Armed);
}

#[tokio::test(start_paused = true)]
async fn periodic_job_waits_for_its_constraints() {
    let ctx = TestContext::new();
    ctx.device.set_charging(false);

    ctx.registrar
        .arm_periodic_job(JOB_ID, JOB_INTERVAL, job_constraints())
        .unwrap();
    wait(JOB_INTERVAL * 2 + JOB_INTERVAL / 2).await;
    assert_eq!(ctx.job_count(), 0);

    ctx.device.set_charging(true);
    ctx.device.set_network(false);
    wait(JOB_INTERVAL).await;
    assert_eq!(ctx.job_count(), 0);

    ctx.device.set_network(true);
    wait(JOB_INTERVAL).await;
    assert_eq!(ctx.job_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn short_job_period_is_raised_to_the_minimum() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_periodic_job(JOB_ID, Duration::from_secs(60), JobConstraints::new())
        .unwrap();
    wait(Duration::from_secs(120)).await;
    assert_eq!(ctx.job_count(), 0);

    wait(crate::simulated::MIN_PERIOD).await;
    assert_eq!(ctx.job_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_job_stops_running() {
    let ctx = TestContext::new();

    ctx.registrar
        .arm_periodic_job(JOB_ID, JOB_INTERVAL, job_constraints())
        .unwrap();
    wait(JOB_INTERVAL + JOB_INTERVAL / 2).await;
    ctx.registrar.cancel_periodic_job(JOB_ID).unwrap();
    ctx.registrar.cancel_periodic_job(JOB_ID).unwrap();
    wait(JOB_INTERVAL * 3).await;

    assert_eq!(ctx.job_count(), 1);
    assert_eq!(ctx.registrar.job_state(JOB_ID), ScheduleState::Unregistered);
}

#[proptest(async = tokio_ct)]
async fn rearming_never_accumulates_alarms(#[strategy(1..8usize)] arm_count: usize) {
    let ctx = TestContext::new();

    for _ in 0..arm_count {
        ctx.registrar
            .arm_repeating_alarm(ALARM_ID, ALARM_INTERVAL)
            .unwrap();
    }
    wait(ALARM_INTERVAL / 2).await;

    prop_assert_eq!(ctx.alarm_count(), 1);
    prop_assert_eq!(ctx.registrar.alarm_state(ALARM_ID), ScheduleState::Armed);
}
