//! Campaign-layer data the tactical engine consumes

pub mod weather;

pub use weather::{CloudCover, GroundCondition, Precipitation, Weather};
