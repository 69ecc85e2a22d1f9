use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Optional stderr spinner reporting how many pileup records were loaded.
#[derive(Debug)]
pub struct LoadProgress {
    progress_bar: Option<ProgressBar>,
    loaded_records: u64,
    skipped_records: u64,
    finished: bool,
}

impl LoadProgress {
    const UPDATE_EVERY: u64 = 10_000;

    pub fn new(enabled: bool, source: &str) -> Self {
        let progress_bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
            let style = ProgressStyle::with_template("{spinner:.green} {elapsed_precise} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(200));
            bar.set_message(format!("loading pileup={source}"));
            Some(bar)
        } else {
            None
        };

        Self {
            progress_bar,
            loaded_records: 0,
            skipped_records: 0,
            finished: false,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, "")
    }

    pub fn on_loaded(&mut self, chromosome: &str, position: u64) {
        self.loaded_records += 1;
        if self.loaded_records == 1 || self.loaded_records.is_multiple_of(Self::UPDATE_EVERY) {
            self.set_message(chromosome, position);
        }
    }

    pub fn on_skipped(&mut self) {
        self.skipped_records += 1;
    }

    pub fn finish(&mut self) {
        if let Some(bar) = &self.progress_bar {
            bar.finish_with_message(format!(
                "done loaded={} skipped={}",
                self.loaded_records, self.skipped_records
            ));
        }
        self.finished = true;
    }

    fn set_message(&self, chromosome: &str, position: u64) {
        if let Some(bar) = &self.progress_bar {
            bar.set_message(format!(
                "loaded={} skipped={} locus={chromosome}:{position}",
                self.loaded_records, self.skipped_records
            ));
        }
    }
}

impl Drop for LoadProgress {
    fn drop(&mut self) {
        if !self.finished
            && let Some(bar) = &self.progress_bar
        {
            bar.finish_and_clear();
        }
    }
}
