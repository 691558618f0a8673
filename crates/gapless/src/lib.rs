#![doc = include_str!("../README.md")]

mod epoch;
mod error;
mod futures;
mod generator;
mod id;
#[cfg(feature = "serde")]
mod serde;
mod store;

pub use crate::epoch::*;
pub use crate::error::*;
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::store::*;
