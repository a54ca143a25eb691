use crate::callback::Callback;

/// Discards every event. Used by tests that only care about pipeline
/// correctness, and as a throughput baseline.
#[derive(Default)]
pub struct NullCallback;

impl Callback for NullCallback {
  fn name(&self) -> &'static str {
    "null"
  }
}
