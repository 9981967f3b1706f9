use std::time::Duration;
use std::thread;
use std::sync::Arc;
use log::debug;

/// Function used to wait between attempts
///
/// Production code uses `thread::sleep`, tests inject a recorder so no real
/// time passes.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// The sleeper that actually blocks the current thread
pub fn thread_sleeper() -> Sleeper {
    Arc::new(thread::sleep)
}

/// Bounded retry mechanism with a fixed delay between attempts
///
/// A handler tracks a single operation. Create a fresh one for every
/// operation so no attempt counts leak between them.
pub struct RetryHandler {
    /// Current attempt number (0-based)
    attempt: usize,
    /// Maximum number of attempts, never less than one
    max_attempts: usize,
    /// Delay between two attempts
    delay: Duration,
    sleeper: Sleeper,
}

impl RetryHandler {
    /// Create a new retry handler with a maximum number of attempts and a fixed delay
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
            delay,
            sleeper: thread_sleeper(),
        }
    }

    /// Replace the function used to wait between attempts
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Get the current attempt number (0-based)
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Get the delay between attempts
    pub fn get_delay(&self) -> Duration {
        self.delay
    }

    /// Check if another attempt is allowed after the current one
    pub fn should_retry(&self) -> bool {
        self.attempt + 1 < self.max_attempts
    }

    /// Wait for the retry interval and move on to the next attempt
    pub fn wait(&mut self) {
        debug!(
            "Retry attempt {}/{}: waiting {:?} before next attempt",
            self.attempt + 2,
            self.max_attempts,
            self.delay
        );
        (self.sleeper)(self.delay);

        self.attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_sleeper() -> (Sleeper, Arc<Mutex<Vec<Duration>>>) {
        let waits = Arc::new(Mutex::new(Vec::new()));
        let recorded = waits.clone();
        let sleeper: Sleeper = Arc::new(move |d| recorded.lock().unwrap().push(d));
        (sleeper, waits)
    }

    #[test]
    fn test_max_attempts() {
        let (sleeper, waits) = recording_sleeper();
        let mut retry = RetryHandler::new(3, Duration::from_millis(10)).with_sleeper(sleeper);

        assert!(retry.should_retry()); // attempt 0
        retry.wait();
        assert!(retry.should_retry()); // attempt 1
        retry.wait();
        assert!(!retry.should_retry()); // attempt 2 is the last one

        assert_eq!(retry.attempt(), 2);
        assert_eq!(*waits.lock().unwrap(), vec![Duration::from_millis(10); 2]);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let retry = RetryHandler::new(0, Duration::from_secs(1));
        assert_eq!(retry.max_attempts(), 1);
        assert!(!retry.should_retry());
    }
}
