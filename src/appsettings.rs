use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use freezap_models::{
    schedule::{JobConstraints, NetworkType, ScheduleId},
    work::TaskId,
};
use freezap_worker::StartPolicy;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorkSettings {
    pub duration_ms: u64,
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self { duration_ms: 7_000 }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WorkerSettings {
    pub start_policy: StartPolicy,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoaderSettings {
    pub task_id: TaskId,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self { task_id: 100 }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AlarmSettings {
    pub id: ScheduleId,
    pub interval_ms: u64,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            id: 0,
            interval_ms: 900_000,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct JobSettings {
    pub id: ScheduleId,
    pub interval_ms: u64,
    pub requires_charging: bool,
    pub requires_network: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            id: 200,
            interval_ms: 3_600_000,
            requires_charging: true,
            requires_network: true,
        }
    }
}

impl JobSettings {
    pub fn constraints(&self) -> JobConstraints {
        let network = if self.requires_network {
            NetworkType::Any
        } else {
            NetworkType::None
        };

        JobConstraints::new()
            .requires_charging(self.requires_charging)
            .required_network(network)
    }
}

/// State of the simulated device the job constraints are checked against.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DeviceSettings {
    pub charging: bool,
    pub network: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            charging: true,
            network: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppSettings {
    pub work: WorkSettings,
    pub worker: WorkerSettings,
    pub loader: LoaderSettings,
    pub alarm: AlarmSettings,
    pub job: JobSettings,
    pub device: DeviceSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work.duration_ms)
    }

    pub fn alarm_interval(&self) -> Duration {
        Duration::from_millis(self.alarm.interval_ms)
    }

    pub fn job_interval(&self) -> Duration {
        Duration::from_millis(self.job.interval_ms)
    }
}
