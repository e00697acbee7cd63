pub mod error;
pub mod headers;
pub mod payload;

pub use error::ChimeError;
pub use headers::Headers;
pub use payload::Payload;
