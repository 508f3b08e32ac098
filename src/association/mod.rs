/// Association domain layer: keyfile persistence and the trust lifecycle.
pub mod errors;
pub mod keyfile;
pub mod session;

pub use errors::LookupError;
pub use session::{Established, establish, verify};
