mod activity;
pub mod boundary;
mod config;
mod geometry;
mod pattern;

pub use activity::*;
pub use config::*;
pub use geometry::*;
pub use pattern::*;
