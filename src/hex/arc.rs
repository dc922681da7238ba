//! Firing arcs, vision cones and bearings
//!
//! A wedge is the 60° sector centred on one hex direction. Hexes lying on
//! the 30° boundary between two directions belong to both wedges.

use super::coord::HexCoord;

/// Default reach of firing arcs and vision cones, in rings
pub const ARC_RADIUS: u32 = 3;

/// Whether `hex` lies in the 60° wedge of `direction` from `origin`
///
/// The origin itself is not part of any wedge.
pub fn in_wedge(origin: HexCoord, direction: u8, hex: HexCoord) -> bool {
    if hex == origin {
        return false;
    }
    // rotate back so the wedge points along direction 0
    let local = hex.relative_to(&origin).rotate((6 - direction % 6) % 6);
    let (q, r) = (local.hx, local.hy);
    if q >= 0 {
        r <= -2 * q
    } else {
        r <= q
    }
}

/// Origin plus every wedge hex of `direction` out to `radius`
pub fn covered_arc(origin: HexCoord, direction: u8, radius: u32) -> Vec<HexCoord> {
    let mut hexes = vec![origin];
    for r in 1..=radius {
        hexes.extend(
            origin
                .ring(r)
                .into_iter()
                .filter(|h| in_wedge(origin, direction, *h)),
        );
    }
    hexes
}

/// Union of the wedges of several directions, origin included once
pub fn covered_arcs(origin: HexCoord, directions: &[u8], radius: u32) -> Vec<HexCoord> {
    let mut hexes = vec![origin];
    for r in 1..=radius {
        for hex in origin.ring(r) {
            if directions.iter().any(|d| in_wedge(origin, *d, hex)) {
                hexes.push(hex);
            }
        }
    }
    hexes
}

/// Every hex within `radius`, used for all-around weapons
pub fn all_around(origin: HexCoord, radius: u32) -> Vec<HexCoord> {
    origin.spiral(radius)
}

/// Lowest direction whose wedge from `from` contains `to`
pub fn bearing(from: HexCoord, to: HexCoord) -> Option<u8> {
    (0..6u8).find(|d| in_wedge(from, *d, to))
}

/// Direction of `to` as seen from `from`, relative to `facing`
pub fn relative_bearing(from: HexCoord, facing: u8, to: HexCoord) -> Option<u8> {
    bearing(from, to).map(|b| (b + 6 - facing % 6) % 6)
}
