//! Bearer token inspection

mod token;

pub use token::{inspect_token, Claims};
