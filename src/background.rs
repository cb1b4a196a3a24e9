use async_trait::async_trait;
use freezap_models::schedule::ScheduleId;
use freezap_scheduler::{AlarmReceiver, JobParameters, JobTarget};
use freezap_worker::SharedWorkUnit;
use tokio::task;

/// Runs the unit of work whenever the alarm or the periodic job goes off.
/// Results only go to the log since no screen is involved.
pub struct BackgroundWorkReceiver {
    work: SharedWorkUnit,
}

impl BackgroundWorkReceiver {
    pub fn new(work: SharedWorkUnit) -> Self {
        Self { work }
    }

    async fn run_work(&self) -> anyhow::Result<()> {
        let work = self.work.clone();
        let result = task::spawn_blocking(move || work.execute()).await??;
        log::info!("Scheduled work finished [result = {result}]");
        Ok(())
    }
}

#[async_trait]
impl AlarmReceiver for BackgroundWorkReceiver {
    async fn on_receive(&self, id: ScheduleId) {
        log::info!("Alarm received [alarm_id = {id}]");
        if let Err(error) = self.run_work().await {
            log::error!("Alarm work failed [alarm_id = {id}, error = {error:#}]");
        }
    }
}

#[async_trait]
impl JobTarget for BackgroundWorkReceiver {
    async fn on_start_job(&self, params: JobParameters) -> bool {
        log::info!("Job started [job_id = {}]", params.job_id);
        match self.run_work().await {
            Ok(()) => true,
            Err(error) => {
                log::error!(
                    "Job work failed [job_id = {}, error = {error:#}]",
                    params.job_id
                );
                false
            }
        }
    }
}
