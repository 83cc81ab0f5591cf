#![forbid(unsafe_code)]

pub mod model;
pub mod progression;
pub mod shuffle;
pub mod time;

pub use progression::ProgressionError;
pub use time::Clock;
