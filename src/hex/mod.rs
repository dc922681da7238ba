//! Hex geometry: pure coordinate math shared by every other module

pub mod arc;
pub mod coord;

pub use arc::{all_around, bearing, covered_arc, covered_arcs, in_wedge, relative_bearing, ARC_RADIUS};
pub use coord::{
    adjacent, direction_between, distance, line_between, ring, rotate_around_origin,
    rotate_direction, steps_between, HexCoord, DIRECTIONS,
};
