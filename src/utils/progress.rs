use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal spinner for coarse stage reporting.
///
/// Every stage message is also emitted through `tracing`, so a silent
/// reporter still leaves a trace in the logs.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            Self { progress_bar: None }
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
            }
        }
    }

    pub fn silent() -> Self {
        Self::new_spinner("", true)
    }

    /// Announce the start of a pipeline stage.
    pub fn stage(&self, message: &str) {
        tracing::info!("{}", message);
        self.set_message(message);
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
