//! Progress reporting for the publish workflow.

/// Receives human readable progress events
pub trait ProgressReporter {
    /// A step is starting
    fn step(&self, message: &str);
    /// Supplementary detail about the current step
    fn detail(&self, message: &str);
    /// A step finished
    fn success(&self, message: &str);
    /// Something went wrong but the workflow continues
    fn warn(&self, message: &str);
}

/// Reporter that only writes to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn step(&self, message: &str) {
        log::info!("{message}");
    }

    fn detail(&self, message: &str) {
        log::info!("  {message}");
    }

    fn success(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }
}
