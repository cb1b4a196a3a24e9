mod error;
mod registrar;
mod service;
pub mod simulated;

pub use error::{ScheduleError, ServiceKind};
pub use registrar::{DeferredScheduleRegistrar, ScheduleState};
pub use service::{
    AlarmReceiver, AlarmService, JobParameters, JobService, JobTarget, SystemServices,
};
