// file: src/pipeline/progress.rs
// description: wait indicator shown until the first fragment arrives
// reference: uses indicatif for spinners

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

pub struct WaitIndicator;

impl WaitIndicator {
    /// A ticking spinner on stderr, or a hidden bar when disabled.
    pub fn start(message: impl Into<String>, enabled: bool, colored: bool) -> ProgressBar {
        if !enabled {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style(colored));
        bar.set_message(message.into());
        bar.enable_steady_tick(TICK);
        bar
    }
}

fn spinner_style(colored: bool) -> ProgressStyle {
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] {msg}"
    } else {
        "{spinner} [{elapsed_precise}] {msg}"
    };

    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_indicator_is_hidden() {
        let bar = WaitIndicator::start("Waiting", false, true);
        assert!(bar.is_hidden());
    }

    #[test]
    fn test_indicator_carries_message() {
        let bar = WaitIndicator::start("Waiting for provider", true, false);
        assert_eq!(bar.message(), "Waiting for provider");
        bar.finish_and_clear();
        assert!(bar.is_finished());
    }
}
