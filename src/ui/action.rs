use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unknown action tag {0}")]
    UnknownAction(u32),

    #[error("Action tag is not a number: {0:?}")]
    InvalidTag(String),
}

/// Buttons of the main screen, keyed by their stable numeric tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blocks the main thread for the whole unit of work.
    RunOnMainThread,
    RunOnWorkerThread,
    ArmAlarm,
    CancelAlarm,
    ArmPeriodicJob,
    RunOneShotTask,
    RunLifecycleTask,
    CancelPeriodicJob,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::RunOnMainThread,
        Action::RunOnWorkerThread,
        Action::ArmAlarm,
        Action::CancelAlarm,
        Action::ArmPeriodicJob,
        Action::RunOneShotTask,
        Action::RunLifecycleTask,
        Action::CancelPeriodicJob,
    ];

    pub fn tag(&self) -> u32 {
        match self {
            Action::RunOnMainThread => 10,
            Action::RunOnWorkerThread => 20,
            Action::ArmAlarm => 30,
            Action::CancelAlarm => 40,
            Action::ArmPeriodicJob => 50,
            Action::RunOneShotTask => 60,
            Action::RunLifecycleTask => 70,
            Action::CancelPeriodicJob => 80,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::RunOnMainThread => "Execute action in main thread",
            Action::RunOnWorkerThread => "Execute action in background",
            Action::ArmAlarm => "Start alarm",
            Action::CancelAlarm => "Stop alarm",
            Action::ArmPeriodicJob => "Execute job scheduler",
            Action::RunOneShotTask => "Execute async task",
            Action::RunLifecycleTask => "Execute async task loader",
            Action::CancelPeriodicJob => "Stop job scheduler",
        }
    }
}

impl TryFrom<u32> for Action {
    type Error = ActionError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Action::ALL
            .into_iter()
            .find(|action| action.tag() == tag)
            .ok_or(ActionError::UnknownAction(tag))
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ActionError::InvalidTag(s.to_owned()))?;

        Action::try_from(tag)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn known_tags_map_to_actions() {
        assert_eq!(Action::try_from(10), Ok(Action::RunOnMainThread));
        assert_eq!(Action::try_from(60), Ok(Action::RunOneShotTask));
        assert_eq!(" 70\n".parse::<Action>(), Ok(Action::RunLifecycleTask));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            "start".parse::<Action>(),
            Err(ActionError::InvalidTag("start".to_owned()))
        );
        assert_eq!(Action::try_from(15), Err(ActionError::UnknownAction(15)));
    }

    #[proptest]
    fn only_known_tags_parse(tag: u32) {
        let known = Action::ALL.iter().any(|action| action.tag() == tag);

        match Action::try_from(tag) {
            Ok(action) => {
                prop_assert!(known);
                prop_assert_eq!(action.tag(), tag);
            }
            Err(error) => {
                prop_assert!(!known);
                prop_assert_eq!(error, ActionError::UnknownAction(tag));
            }
        }
    }
}
