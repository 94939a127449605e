//! Vector helpers shared by actors, projectiles and the spawn policy.
//!
//! Thin wrappers over `Vec3` that add the guarantees the simulation relies
//! on: no NaN/infinite component ever reaches the registry.

use bevy::math::Vec3;

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Distance on the horizontal (x/z) plane, ignoring altitude.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit vector from `from` towards `to`, or zero when the points coincide.
pub fn direction(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).normalize_or_zero()
}

/// Horizontal unit vector from `from` towards `to` (y dropped).
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

/// Yaw angle (radians, around +Y) that faces along `dir`.
pub fn yaw_of(dir: Vec3) -> f32 {
    if dir.x == 0.0 && dir.z == 0.0 {
        return 0.0;
    }
    dir.x.atan2(dir.z)
}

/// Replace non-finite components with `fallback`'s.
pub fn sanitize(v: Vec3, fallback: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.is_finite() { v.x } else { fallback.x },
        if v.y.is_finite() { v.y } else { fallback.y },
        if v.z.is_finite() { v.z } else { fallback.z },
    )
}

/// Whether every component is finite.
pub fn is_finite(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Block coordinate containing a point.
pub fn block_of(p: Vec3) -> (i32, i32, i32) {
    (p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
}

/// Scale `v` down to at most `max` length. Non-finite components become
/// zero; huge finite vectors are rescaled before their length is taken.
pub fn clamp_speed(v: Vec3, max: f32) -> Vec3 {
    let v = sanitize(v, Vec3::ZERO);
    let scale = v.abs().max_element();
    if scale == 0.0 {
        return v;
    }
    let unit = v / scale;
    if unit.length() * scale > max {
        unit.normalize_or_zero() * max.max(0.0)
    } else {
        v
    }
}

/// Closest approach of point `p` to segment `a..b`: the distance and the
/// segment parameter in `0..=1` where it occurs.
pub fn segment_point_distance(a: Vec3, b: Vec3, p: Vec3) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (a.distance(p), 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    ((a + ab * t).distance(p), t)
}
