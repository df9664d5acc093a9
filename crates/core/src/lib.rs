#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod reducer;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use reducer::{SessionAction, reduce};
pub use time::Clock;
