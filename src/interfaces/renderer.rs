use crate::error::Result;
use crate::types::observation::WindowRow;

/// Presentation sink for the rolling window. Called synchronously from the
/// poll loop on every accepted observation, so implementations must be fast.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send {
    fn render(&mut self, rows: &[WindowRow]) -> Result<()>;
}
