use std::fmt;

use chrono::{DateTime, Utc};

/// Identifier of a lifecycle-surviving task handle.
pub type TaskId = u32;

/// The only payload produced by a unit of work: the moment it finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkResult(DateTime<Utc>);

impl WorkResult {
    pub fn new(finished_at: DateTime<Utc>) -> Self {
        Self(finished_at)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn finished_at(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl fmt::Display for WorkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp_millis())
    }
}
