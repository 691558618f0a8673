mod calendar;
mod clock;
mod key;

pub use calendar::*;
pub use clock::*;
pub use key::*;
