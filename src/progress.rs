use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the batch, one tick per URL reaching a terminal state.
/// Disabled in quiet mode and when stdout is not interactive.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self { bar: None, enabled }
    }

    pub fn start_batch(&mut self, total_urls: usize) {
        if !self.enabled {
            return;
        }

        let pb = ProgressBar::new(total_urls as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.yellow/red}] {pos}/{len} URLs checked ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message("Checking URLs");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.bar = Some(pb);
    }

    pub fn update_batch_progress(&self, current: usize) {
        if let Some(ref pb) = self.bar {
            pb.set_position(current as u64);
        }
    }

    pub fn finish_batch(&self, reachable: usize, total: usize) {
        if let Some(ref pb) = self.bar {
            let message = if reachable == total {
                "✓ All URLs reachable".to_string()
            } else {
                format!("✓ Batch complete ({reachable}/{total} reachable)")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(ref pb) = self.bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = ProgressReporter::new(true);
        assert!(reporter.enabled);
        assert!(reporter.bar.is_none());
    }

    #[test]
    fn test_progress_methods_dont_panic_when_disabled() {
        let mut reporter = ProgressReporter::new(false);

        reporter.start_batch(10);
        assert!(reporter.bar.is_none());
        reporter.update_batch_progress(5);
        reporter.finish_batch(5, 10);
        reporter.finish_and_clear();
    }

    #[test]
    fn test_enabled_progress_reporter() {
        let mut reporter = ProgressReporter::new(true);

        reporter.start_batch(10);
        assert!(reporter.bar.is_some());
        reporter.update_batch_progress(7);
        reporter.finish_batch(7, 10);
    }

    #[test]
    fn test_progress_zero_values() {
        let mut reporter = ProgressReporter::new(true);

        reporter.start_batch(0);
        reporter.update_batch_progress(0);
        reporter.finish_batch(0, 0);
    }

    #[test]
    fn test_progress_reporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgressReporter>();
    }
}
