use std::fmt;

use freezap_models::schedule::ScheduleId;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServiceKind {
    Alarm,
    JobScheduler,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Alarm => write!(f, "alarm service"),
            ServiceKind::JobScheduler => write!(f, "job scheduler service"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("The {0} is unavailable")]
    ServiceUnavailable(ServiceKind),

    #[error("Registration {id} was rejected: {reason}")]
    Rejected { id: ScheduleId, reason: String },
}
