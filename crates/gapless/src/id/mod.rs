mod document_id;
mod error;
mod parse;
mod tag;

pub use document_id::*;
pub use error::*;
pub use parse::*;
pub use tag::*;
