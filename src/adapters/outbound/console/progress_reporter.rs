use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::cell::RefCell;

const BAR_TEMPLATE: &str = "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// Writes to stderr so the report on stdout stays clean. Registry lookups
/// get an indicatif bar that is dropped once the batch completes, so the
/// next technology starts a fresh one.
pub struct StderrProgressReporter {
    progress_bar: RefCell<Option<ProgressBar>>,
    colored: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: RefCell::new(None),
            colored: true,
        }
    }

    /// Disables ANSI colors in warnings and completion messages.
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn bar_for(&self, total: usize) -> ProgressBar {
        let mut slot = self.progress_bar.borrow_mut();
        match slot.as_ref() {
            Some(bar) if bar.length() == Some(total as u64) => bar.clone(),
            _ => {
                if let Some(stale) = slot.take() {
                    stale.finish_and_clear();
                }
                let bar = ProgressBar::with_draw_target(
                    Some(total as u64),
                    ProgressDrawTarget::stderr(),
                );
                if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars("=>-"));
                }
                *slot = Some(bar.clone());
                bar
            }
        }
    }

    fn clear_bar(&self) {
        if let Some(bar) = self.progress_bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        match self.progress_bar.borrow().as_ref() {
            Some(bar) => bar.println(message),
            None => eprintln!("{}", message),
        }
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let bar = self.bar_for(total);
        bar.set_position(current as u64);
        if let Some(msg) = message {
            bar.set_message(msg.to_string());
        }
    }

    fn report_warning(&self, message: &str) {
        self.clear_bar();
        if self.colored {
            eprintln!("{}", message.yellow());
        } else {
            eprintln!("{}", message);
        }
    }

    fn report_completion(&self, message: &str) {
        self.clear_bar();
        if self.colored {
            eprintln!("✅ {}", message.green());
        } else {
            eprintln!("✅ {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_is_replaced_when_total_changes() {
        let reporter = StderrProgressReporter::new().without_color();
        reporter.report_progress(1, 4, Some("Fetching registry metadata"));
        assert_eq!(reporter.bar_for(4).length(), Some(4));

        reporter.report_progress(1, 9, None);
        assert_eq!(reporter.bar_for(9).length(), Some(9));
    }

    #[test]
    fn test_completion_clears_bar() {
        let reporter = StderrProgressReporter::new().without_color();
        reporter.report_progress(2, 2, None);
        reporter.report_completion("Registry metadata fetched");
        assert!(reporter.progress_bar.borrow().is_none());
    }

    #[test]
    fn test_warning_clears_bar() {
        let reporter = StderrProgressReporter::default();
        reporter.report("📖 Resolving node dependencies");
        reporter.report_progress(1, 3, None);
        reporter.report_warning("⚠️  Warning: lookup failed");
        assert!(reporter.progress_bar.borrow().is_none());
    }
}
