pub mod batch;
pub mod codec;
pub mod error;
pub mod trim;

pub use batch::{Outcome, Summary, Trimmer};
pub use codec::{CodecSession, ImageCodec, OutputFormat};
pub use error::{Error, Result};
