//! Hex coordinate system for scenario maps (axial coordinates)
//!
//! Axial `(hx, hy)` converts to cube `(x, y, z)` with `x = hx`, `z = hy`,
//! `y = -x - z`. Directions run clockwise from 0 (straight ahead).

use serde::{Deserialize, Serialize};

/// Axial offsets for directions 0..=5, clockwise from straight ahead
pub const DIRECTIONS: [(i32, i32); 6] = [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)];

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub hx: i32,
    pub hy: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { hx: 0, hy: 0 };

    pub const fn new(hx: i32, hy: i32) -> Self {
        Self { hx, hy }
    }

    /// Cube coordinates `(x, y, z)`
    pub fn cube(&self) -> (i32, i32, i32) {
        (self.hx, -self.hx - self.hy, self.hy)
    }

    pub fn from_cube(x: i32, _y: i32, z: i32) -> Self {
        Self::new(x, z)
    }

    /// Cube Manhattan distance divided by 2
    pub fn distance(&self, other: &Self) -> u32 {
        let (ax, ay, az) = self.cube();
        let (bx, by, bz) = other.cube();
        (((ax - bx).abs() + (ay - by).abs() + (az - bz).abs()) / 2) as u32
    }

    /// Neighbour in `direction` (taken modulo 6)
    pub fn adjacent(&self, direction: u8) -> Self {
        let (dq, dr) = DIRECTIONS[(direction % 6) as usize];
        Self::new(self.hx + dq, self.hy + dr)
    }

    /// All 6 neighbours in direction order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            self.adjacent(0),
            self.adjacent(1),
            self.adjacent(2),
            self.adjacent(3),
            self.adjacent(4),
            self.adjacent(5),
        ]
    }

    /// Direction from `self` to an adjacent hex, `None` when not adjacent
    pub fn direction_to(&self, other: &Self) -> Option<u8> {
        let delta = (other.hx - self.hx, other.hy - self.hy);
        DIRECTIONS
            .iter()
            .position(|d| *d == delta)
            .map(|i| i as u8)
    }

    /// Offset of `self` relative to `origin`
    pub fn relative_to(&self, origin: &Self) -> Self {
        Self::new(self.hx - origin.hx, self.hy - origin.hy)
    }

    pub fn offset(&self, delta: HexCoord) -> Self {
        Self::new(self.hx + delta.hx, self.hy + delta.hy)
    }

    /// Rotate around (0,0) by `steps` clockwise sixth-turns
    pub fn rotate(&self, steps: u8) -> Self {
        let mut q = self.hx;
        let mut r = self.hy;
        for _ in 0..(steps % 6) {
            let nq = -r;
            let nr = q + r;
            q = nq;
            r = nr;
        }
        Self::new(q, r)
    }

    /// Hexes at exactly `radius` steps, walking clockwise from `dir4 * radius`
    pub fn ring(&self, radius: u32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }

        let r = radius as i32;
        let (sq, sr) = DIRECTIONS[4];
        let mut hex = HexCoord::new(self.hx + sq * r, self.hy + sr * r);
        let mut results = Vec::with_capacity(6 * radius as usize);
        for direction in 0..6u8 {
            for _ in 0..radius {
                results.push(hex);
                hex = hex.adjacent(direction);
            }
        }
        results
    }

    /// Center plus rings 1..=radius, in ring order
    pub fn spiral(&self, radius: u32) -> Vec<HexCoord> {
        (0..=radius).flat_map(|r| self.ring(r)).collect()
    }

    /// Connected line of hexes from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }

        // nudge so that ties on hex edges always round the same way
        let (ax, _, az) = self.cube();
        let (bx, _, bz) = other.cube();
        let ax = ax as f64 + 1e-6;
        let az = az as f64 + 2e-6;
        let bx = bx as f64 + 1e-6;
        let bz = bz as f64 + 2e-6;

        let mut results = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let x = ax + (bx - ax) * t;
            let z = az + (bz - az) * t;
            results.push(Self::round(x, z));
        }
        results
    }

    /// Round floating point cube coordinates to the nearest hex
    fn round(x: f64, z: f64) -> Self {
        let y = -x - z;
        let mut rx = x.round();
        let ry = y.round();
        let mut rz = z.round();

        let x_diff = (rx - x).abs();
        let y_diff = (ry - y).abs();
        let z_diff = (rz - z).abs();

        if x_diff > y_diff && x_diff > z_diff {
            rx = -ry - rz;
        } else if y_diff <= z_diff {
            rz = -rx - ry;
        }

        Self::new(rx as i32, rz as i32)
    }
}

/// Symmetric hex distance
pub fn distance(a: HexCoord, b: HexCoord) -> u32 {
    a.distance(&b)
}

/// Neighbour of `hex` in `direction`
pub fn adjacent(hex: HexCoord, direction: u8) -> HexCoord {
    hex.adjacent(direction)
}

/// Inverse of [`adjacent`]; `None` when the hexes are not neighbours
pub fn direction_between(a: HexCoord, b: HexCoord) -> Option<u8> {
    a.direction_to(&b)
}

/// All hexes exactly `radius` away from `center`
pub fn ring(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    center.ring(radius)
}

pub fn line_between(a: HexCoord, b: HexCoord) -> Vec<HexCoord> {
    a.line_to(&b)
}

pub fn rotate_around_origin(hex: HexCoord, steps: u8) -> HexCoord {
    hex.rotate(steps)
}

/// Turn a facing by `steps` clockwise
pub fn rotate_direction(direction: u8, steps: u8) -> u8 {
    (direction % 6 + steps % 6) % 6
}

/// Clockwise steps needed to turn from `from` to `to`
pub fn steps_between(from: u8, to: u8) -> u8 {
    (to % 6 + 6 - from % 6) % 6
}
