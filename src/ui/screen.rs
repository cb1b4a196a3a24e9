use std::{
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use freezap_models::work::WorkResult;
use freezap_scheduler::ScheduleError;
use freezap_worker::{BackgroundWorker, HandlerThread, ObserverRef, TaskObserver, WorkerError};

use super::{action::Action, feedback::UiFeedback};
use crate::app::AppContext;

const HANDLER_THREAD_NAME: &str = "freezap-handler";

/// One instance of the main screen. Created and destroyed on the main thread;
/// a configuration change replaces it with a fresh instance.
pub struct MainScreen {
    app: Arc<AppContext>,
    feedback: Arc<dyn UiFeedback>,
    worker: BackgroundWorker,
    handler_thread: Mutex<Option<HandlerThread>>,
}

impl MainScreen {
    pub fn new(app: Arc<AppContext>, feedback: Arc<dyn UiFeedback>) -> Arc<Self> {
        let worker = BackgroundWorker::new(
            app.runtime.clone(),
            app.main.clone(),
            Arc::clone(&app.work),
            app.settings.worker.start_policy,
        );

        Arc::new(Self {
            app,
            feedback,
            worker,
            handler_thread: Mutex::new(None),
        })
    }

    pub fn on_create(self: &Arc<Self>) -> io::Result<()> {
        let handler_thread = HandlerThread::start(
            HANDLER_THREAD_NAME,
            self.app.main.clone(),
            Arc::clone(&self.app.work),
            ObserverRef::new(self),
        )?;
        *self.handler_thread() = Some(handler_thread);

        let task_id = self.app.settings.loader.task_id;
        if self
            .app
            .tasks
            .resume(task_id, ObserverRef::new(self))
            .is_some()
        {
            log::info!("Resumed lifecycle task [task_id = {task_id}]");
        }

        Ok(())
    }

    pub fn on_destroy(self: &Arc<Self>) {
        if let Some(mut handler_thread) = self.handler_thread().take() {
            handler_thread.quit();
        }
        self.app
            .tasks
            .detach(self.app.settings.loader.task_id, &ObserverRef::new(self));
    }

    pub fn on_action(self: &Arc<Self>, action: Action) {
        log::debug!("Action triggered [action = {action:?}, tag = {}]", action.tag());
        match action {
            Action::RunOnMainThread => self.run_on_main_thread(),
            Action::RunOnWorkerThread => self.run_on_worker_thread(),
            Action::ArmAlarm => self.arm_alarm(),
            Action::CancelAlarm => self.cancel_alarm(),
            Action::ArmPeriodicJob => self.arm_periodic_job(),
            Action::CancelPeriodicJob => self.cancel_periodic_job(),
            Action::RunOneShotTask => self.run_one_shot_task(),
            Action::RunLifecycleTask => self.run_lifecycle_task(),
        }
    }

    fn handler_thread(&self) -> MutexGuard<'_, Option<HandlerThread>> {
        self.handler_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn run_on_main_thread(&self) {
        log::warn!("Running the long action on the main thread, the UI is frozen until it ends");
        match self.app.work.execute() {
            Ok(result) => log::info!("Main thread action finished [result = {result}]"),
            Err(error) => log::error!("Main thread action failed [error = {error:#}]"),
        }
    }

    fn run_on_worker_thread(&self) {
        let started = match self.handler_thread().as_ref() {
            Some(handler_thread) => handler_thread.start_handler(),
            None => Err(WorkerError::ThreadQuit(HANDLER_THREAD_NAME.to_owned())),
        };
        if let Err(error) = started {
            self.show_error(&error);
        }
    }

    fn run_one_shot_task(self: &Arc<Self>) {
        if let Err(error) = self.worker.start(ObserverRef::new(self)) {
            self.show_error(&error);
        }
    }

    fn run_lifecycle_task(self: &Arc<Self>) {
        let task_id = self.app.settings.loader.task_id;
        let handle = self.app.tasks.attach_or_create(task_id, ObserverRef::new(self));
        log::debug!(
            "Lifecycle task attached [task_id = {}, state = {:?}]",
            handle.id(),
            handle.state()
        );
    }

    fn arm_alarm(&self) {
        let settings = &self.app.settings;
        match self
            .app
            .registrar
            .arm_repeating_alarm(settings.alarm.id, settings.alarm_interval())
        {
            Ok(()) => self.feedback.show_message("Alarm set !"),
            Err(error) => self.show_scheduling_error(&error),
        }
    }

    fn cancel_alarm(&self) {
        match self
            .app
            .registrar
            .cancel_repeating_alarm(self.app.settings.alarm.id)
        {
            Ok(()) => self.feedback.show_message("Alarm Canceled !"),
            Err(error) => self.show_scheduling_error(&error),
        }
    }

    fn arm_periodic_job(&self) {
        let settings = &self.app.settings;
        match self.app.registrar.arm_periodic_job(
            settings.job.id,
            settings.job_interval(),
            settings.job.constraints(),
        ) {
            Ok(()) => self.feedback.show_message("Job scheduled !"),
            Err(error) => self.show_scheduling_error(&error),
        }
    }

    fn cancel_periodic_job(&self) {
        match self
            .app
            .registrar
            .cancel_periodic_job(self.app.settings.job.id)
        {
            Ok(()) => self.feedback.show_message("Job canceled !"),
            Err(error) => self.show_scheduling_error(&error),
        }
    }

    fn show_error(&self, error: &WorkerError) {
        log::warn!("Could not start background work [error = {error}]");
        self.feedback.show_message(&error.to_string());
    }

    fn show_scheduling_error(&self, error: &ScheduleError) {
        log::error!("Scheduling failed [error = {error}]");
        self.feedback
            .show_message(&format!("Scheduling failed: {error}"));
    }
}

impl TaskObserver for MainScreen {
    fn on_before_start(&self) {
        self.feedback.set_busy(true);
    }

    fn on_after_finish(&self, result: WorkResult) {
        self.feedback.set_busy(false);
        self.feedback
            .show_message(&format!("Task is finally finished at : {result} !"));
    }
}
