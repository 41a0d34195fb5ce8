//! Command-line entry points.

pub mod status;
pub mod submit;
pub mod worker;
