use std::sync::{Arc, Weak};

use freezap_models::work::WorkResult;

/// UI-side listener of a background execution. `on_before_start` and
/// `on_after_finish` are always invoked on the main thread.
pub trait TaskObserver: Send + Sync {
    fn on_before_start(&self);

    /// Invoked from the background thread right before the work runs.
    fn on_work_unit(&self) {}

    fn on_after_finish(&self, result: WorkResult);
}

/// Non-owning reference to an observer. Notifications to an observer that has
/// already been dropped are skipped.
#[derive(Clone)]
pub struct ObserverRef(Weak<dyn TaskObserver>);

impl ObserverRef {
    pub fn new<O: TaskObserver + 'static>(observer: &Arc<O>) -> Self {
        let observer: Weak<O> = Arc::downgrade(observer);
        Self(observer)
    }

    /// Whether both references point at the same observer.
    pub fn is_same(&self, other: &ObserverRef) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }

    pub fn upgrade(&self) -> Option<Arc<dyn TaskObserver>> {
        self.0.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn notify(&self, callback: impl FnOnce(&dyn TaskObserver)) -> bool {
        match self.upgrade() {
            Some(observer) => {
                callback(observer.as_ref());
                true
            }
            None => {
                log::debug!("Observer expired, skipping callback");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ObserverEvent, RecordingObserver};

    #[test]
    fn notifies_a_live_observer() {
        let (observer, _events) = RecordingObserver::new();
        let observer_ref = ObserverRef::new(&observer);

        let notified = observer_ref.notify(|o| o.on_before_start());

        assert!(notified);
        assert_eq!(observer.events(), vec![ObserverEvent::BeforeStart]);
    }

    #[test]
    fn skips_an_expired_observer() {
        let (observer, _events) = RecordingObserver::new();
        let observer_ref = ObserverRef::new(&observer);
        drop(observer);

        let notified = observer_ref.notify(|o| o.on_before_start());

        assert!(!notified);
        assert!(!observer_ref.is_alive());
    }

    #[test]
    fn references_to_one_observer_compare_equal() {
        let (first, _first_events) = RecordingObserver::new();
        let (second, _second_events) = RecordingObserver::new();

        assert!(ObserverRef::new(&first).is_same(&ObserverRef::new(&first)));
        assert!(!ObserverRef::new(&first).is_same(&ObserverRef::new(&second)));
    }
}
