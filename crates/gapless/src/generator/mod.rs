mod attempt;
mod config;
mod reset;
mod retry;
mod sequencer;
mod stats;

pub use config::*;
pub use reset::*;
pub use retry::*;
pub use sequencer::*;
