//! Callback registry: name → constructor table, selected at startup by the
//! first command-line argument. Grounded on `dog`'s
//! `IndexSubcommand` enum (`src/subcommand/index.rs`), which dispatches a
//! small closed set of variants from a CLI-selected name.

mod help;
mod null;
mod summary;

pub use {help::HelpCallback, null::NullCallback, summary::SummaryCallback};

use crate::callback::Callback;

/// Construct the named callback, or `None` if unregistered — the CLI layer
/// turns that into a `help`-listing ("`help` is the
/// default and lists registered names").
pub fn construct(name: &str) -> Option<Box<dyn Callback>> {
  match name {
    "help" => Some(Box::new(HelpCallback)),
    "null" => Some(Box::new(NullCallback::default())),
    "summary" => Some(Box::new(SummaryCallback::default())),
    _ => None,
  }
}

pub fn registered_names() -> &'static [&'static str] {
  &["help", "null", "summary"]
}
