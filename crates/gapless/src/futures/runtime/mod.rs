#[cfg(feature = "async-smol")]
mod smol;
#[cfg(feature = "async-tokio")]
mod tokio;

#[cfg(feature = "async-smol")]
pub use self::smol::*;
#[cfg(feature = "async-tokio")]
pub use self::tokio::*;
