// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::f64::consts::PI;

/// Mean radius of Earth, in meters.
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let sin_dlat_half = ((lat2 - lat1).to_radians() * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1).to_radians() * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + phi1.cos() * phi2.cos() * sin_dlon_half * sin_dlon_half;

    2.0 * EARTH_RADIUS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Calculates the [initial bearing](https://www.movable-type.co.uk/scripts/latlong.html#bearing)
/// when travelling from the first to the second position, in radians from north
/// (positive clockwise, range `(-π, π]`).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    y.atan2(x)
}

/// Calculates by how much the heading changes when travelling `a → b → c`.
/// The result is in radians, within `[0, π]`.
///
/// Returns `None` if either segment has zero length, as its bearing is undefined.
pub fn turn_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<f64> {
    if a == b || b == c {
        return None;
    }

    let incoming = initial_bearing(a.0, a.1, b.0, b.1);
    let outgoing = initial_bearing(b.0, b.1, c.0, c.1);

    let mut delta = (outgoing - incoming).abs();
    if delta > PI {
        delta = 2.0 * PI - delta;
    }
    Some(delta)
}

/// Distance between two positions treating lat-lon as a flat plane, in degrees.
///
/// Only meaningful for comparing distances over small areas.
#[inline]
pub fn planar_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    (lat2 - lat1).hypot(lon2 - lon1)
}
