#![forbid(unsafe_code)]

pub mod model;
pub mod parser;
pub mod reconcile;
pub mod sample;
pub mod stats;
pub mod time;

pub use time::Clock;
