//! Stderr progress reporting during Pass 4, grounded on `dog`'s
//! `Updater::update_index` (`src/index/updater.rs`): an `indicatif` bar with
//! a `{wide_bar} {pos}/{len}`-style template, suppressed whenever `-v`
//! logging is already producing per-block `info!` lines so the two don't
//! fight over the same terminal line.

use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressReporter {
  bar: Option<ProgressBar>,
}

impl ProgressReporter {
  /// `chain_size` is the total number of main-chain blocks Pass 4 will visit.
  pub fn new(chain_size: u64) -> Self {
    let bar = if log::log_enabled!(log::Level::Info) {
      None
    } else {
      let bar = ProgressBar::new(chain_size);
      bar.set_style(
        ProgressStyle::with_template("[parsing blocks] {wide_bar} {pos}/{len} ({bytes_per_sec}, eta {eta})")
          .unwrap_or_else(|_| ProgressStyle::default_bar()),
      );
      Some(bar)
    };
    ProgressReporter { bar }
  }

  pub fn tick(&self, bytes_in_block: u64) {
    if let Some(bar) = &self.bar {
      bar.inc(1);
      bar.inc_length(0); // keep bytes_per_sec fresh without changing the length unit
      let _ = bytes_in_block;
    }
  }

  pub fn finish(&self) {
    if let Some(bar) = &self.bar {
      bar.finish_and_clear();
    }
  }
}
