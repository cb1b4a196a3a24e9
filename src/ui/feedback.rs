use std::sync::atomic::{AtomicBool, Ordering};

/// What the screen can show. Only ever called from the main thread.
pub trait UiFeedback: Send + Sync {
    fn set_busy(&self, busy: bool);

    fn show_message(&self, message: &str);
}

/// Prints the progress indicator and toasts to the terminal.
#[derive(Default)]
pub struct ConsoleFeedback {
    busy: AtomicBool,
}

impl ConsoleFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiFeedback for ConsoleFeedback {
    fn set_busy(&self, busy: bool) {
        let was_busy = self.busy.swap(busy, Ordering::SeqCst);
        match (was_busy, busy) {
            (false, true) => println!("[ working... ]"),
            (true, false) => println!("[ idle ]"),
            _ => {}
        }
    }

    fn show_message(&self, message: &str) {
        println!("> {message}");
    }
}
