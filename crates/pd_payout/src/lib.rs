pub mod engine;
pub mod state;

pub use engine::{calculate, rescale};
pub use state::{transition, Command, PayoutEvent, PayoutState};
