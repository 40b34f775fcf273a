//! Filter parameters and the stage pipeline that consumes them.

pub mod params;
pub mod pipeline;
