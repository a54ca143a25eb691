use crate::callback::Callback;

/// Default callback: lists every registered name and does nothing else.
#[derive(Default)]
pub struct HelpCallback;

impl Callback for HelpCallback {
  fn name(&self) -> &'static str {
    "help"
  }

  fn need_tx_hash(&self) -> bool {
    false
  }

  fn start_lc(&mut self) {
    println!("Registered callbacks:");
    for name in super::registered_names() {
      println!("  {name}");
    }
  }
}
