use std::time::Duration;

/// Identifier of an OS-level schedule registration.
pub type ScheduleId = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NetworkType {
    #[default]
    None,
    Any,
}

/// Conditions the OS job service checks before running a periodic job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct JobConstraints {
    pub requires_charging: bool,
    pub required_network: NetworkType,
}

impl JobConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requires_charging(mut self, requires_charging: bool) -> Self {
        self.requires_charging = requires_charging;
        self
    }

    pub fn required_network(mut self, network: NetworkType) -> Self {
        self.required_network = network;
        self
    }

    pub fn is_satisfied_by(&self, charging: bool, network_available: bool) -> bool {
        let charging_ok = !self.requires_charging || charging;
        let network_ok = match self.required_network {
            NetworkType::None => true,
            NetworkType::Any => network_available,
        };

        charging_ok && network_ok
    }
}

/// Elapsed-realtime repeating alarm: first trigger at `trigger_at_elapsed` after boot,
/// then every `interval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlarmSpec {
    pub trigger_at_elapsed: Duration,
    pub interval: Duration,
    pub wakeup: bool,
}

impl AlarmSpec {
    pub fn repeating(interval: Duration) -> Self {
        Self {
            trigger_at_elapsed: Duration::ZERO,
            interval,
            wakeup: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub id: ScheduleId,
    pub period: Duration,
    pub constraints: JobConstraints,
}
