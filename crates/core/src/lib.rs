#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod time;

pub use progress::{Progress, progress_ratio};
pub use time::Clock;
