//! Streaming token layer: the pull-based reader and push-based writer the
//! drivers are built on

mod reader;
mod token;
mod writer;

pub use reader::TokenReader;
pub use token::{JsonToken, ReadStep};
pub use writer::TokenWriter;
