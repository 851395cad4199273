pub mod poll_engine;
pub mod rolling_window;
pub mod state_machine;

pub use poll_engine::PollEngine;
pub use rolling_window::RollingWindow;
pub use state_machine::{BackoffStateMachine, PollState};
