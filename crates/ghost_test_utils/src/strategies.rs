//! Proptest strategies for detection testing.

use ghost_core::math::{Vec3, ViewAngles};
use proptest::prelude::*;

/// An angle in `[0, 360)`.
pub fn arb_angle() -> impl Strategy<Value = f32> {
    0.0f32..360.0
}

/// A view orientation.
pub fn arb_view() -> impl Strategy<Value = ViewAngles> {
    (arb_angle(), arb_angle()).prop_map(|(h, v)| ViewAngles::new(h, v))
}

/// A world position within typical map bounds.
pub fn arb_position() -> impl Strategy<Value = Vec3> {
    (-4096.0f32..4096.0, -4096.0f32..4096.0, -512.0f32..512.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// One sampled camera placement: position plus (T, CT) scores.
pub type CameraStep = (Vec3, u32, u32);

/// A camera path over a small pool of positions and scores, so keys repeat.
pub fn arb_camera_path(max_len: usize) -> impl Strategy<Value = Vec<CameraStep>> {
    let pool = [
        Vec3::new(100.0, 200.0, 64.0),
        Vec3::new(-880.5, 412.25, 0.0),
        Vec3::new(1500.0, -32.0, 128.0),
        Vec3::new(0.0, 0.0, 0.0),
    ];
    proptest::collection::vec(
        (0usize..pool.len(), 0u32..3, 0u32..3).prop_map(move |(i, t, ct)| (pool[i], t, ct)),
        0..max_len,
    )
}
