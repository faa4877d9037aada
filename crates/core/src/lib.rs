#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod playback;
pub mod progress;
pub mod time;

pub use error::Error;
pub use time::Clock;
