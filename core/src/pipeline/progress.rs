use indicatif::{ProgressBar, ProgressStyle};

/// Progress of the sequential judge stage.
///
/// Hidden when disabled, so callers never branch on it.
pub struct JudgeProgress {
    bar: ProgressBar,
    enabled: bool,
}

impl JudgeProgress {
    pub fn new(total_cases: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let bar = ProgressBar::new(total_cases as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} cases ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░  "));
        }
        bar.set_message("judging...");

        Self { bar, enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mark one case as done.
    pub fn case_done(&self, case_id: &str, outcome: &str) {
        if self.enabled {
            self.bar.set_message(format!("{case_id} ({outcome})"));
            self.bar.inc(1);
        }
    }

    pub fn finish(&self, msg: &str) {
        if self.enabled {
            self.bar.finish_with_message(msg.to_string());
        }
    }
}

impl Drop for JudgeProgress {
    fn drop(&mut self) {
        if self.enabled && !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
