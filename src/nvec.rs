use std::ops::{Add, Mul};

use geo_types::Coord;
use s2::r3::vector::Vector;

/**
 * n-vectors are surface normals used as an alternate representation of
 * geographic coordinates. Interpolating between two of them and normalizing
 * traces the great circle between the endpoints, which is how cell edges are
 * densified before planar comparison.
 *
 * https://en.wikipedia.org/wiki/N-vector
 */
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NVec {
    x: f64,
    y: f64,
    z: f64,
}

impl NVec {
    pub fn norm(&self) -> f64 {
        // Re-use the vector math from the S2 library since we already have
        // that dependency.
        Vector {
            x: self.x,
            y: self.y,
            z: self.z,
        }
        .norm()
    }

    /**
     * The point a fraction `t` of the way from `self` to `other` along their
     * great circle, renormalized back onto the sphere.
     */
    pub fn interpolate(self, t: f64, other: NVec) -> NVec {
        let v = (1.0 - t) * self + t * other;
        (1.0 / (v.norm() + 1e-8)) * v
    }
}

/// Interpolates between two geographic coordinates along their great circle.
pub fn lerp(t: f64, c1: Coord, c2: Coord) -> Coord {
    NVec::from(c1).interpolate(t, NVec::from(c2)).into()
}

impl From<NVec> for Coord {
    fn from(nv: NVec) -> Coord {
        let lat = f64::atan2(nv.z, f64::sqrt(nv.y * nv.y + nv.x * nv.x));
        let lng = f64::atan2(nv.y, nv.x);
        Coord {
            x: lng.to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

impl From<Coord> for NVec {
    fn from(c: Coord) -> NVec {
        let (lng, lat) = (c.x.to_radians(), c.y.to_radians());
        let cos_lat = f64::cos(lat);
        NVec {
            x: f64::cos(lng) * cos_lat,
            y: f64::sin(lng) * cos_lat,
            z: f64::sin(lat),
        }
    }
}

impl Mul<f64> for NVec {
    type Output = NVec;

    fn mul(self, rhs: f64) -> NVec {
        NVec {
            x: rhs * self.x,
            y: rhs * self.y,
            z: rhs * self.z,
        }
    }
}

impl Mul<NVec> for f64 {
    type Output = NVec;

    fn mul(self, rhs: NVec) -> NVec {
        rhs * self
    }
}

impl Add for NVec {
    type Output = NVec;

    fn add(self, rhs: NVec) -> NVec {
        NVec {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}
