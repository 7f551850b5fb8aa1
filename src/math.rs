use std::f32::consts::{PI, TAU};
use std::ops::Add;

/// Wraps an angle in radians to the half-open interval `(-PI, PI]`.
fn wrap_radians(radians: f32) -> f32 {
    let r = radians % TAU;
    if r > PI {
        r - TAU
    } else if r <= -PI {
        r + TAU
    } else {
        r
    }
}

/// An orientation in radians, always kept wrapped to `(-PI, PI]`.
///
/// Addition and subtraction re-wrap, so accumulating angular velocity over
/// many steps never drifts out of range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Angle(f32);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn from_radians(radians: f32) -> Self {
        Angle(wrap_radians(radians))
    }

    pub fn as_radians(self) -> f32 {
        self.0
    }

    /// Shortest-path interpolation from `self` to `other`.
    ///
    /// `t = 0` returns `self`, `t = 1` returns `other` (up to wrapping); the
    /// blend always crosses the smaller of the two arcs between them.
    pub fn lerp(self, other: Angle, t: f32) -> Angle {
        let delta = wrap_radians(other.0 - self.0);
        Angle::from_radians(self.0 + delta * t)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::from_radians(self.0 + rhs.0)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::ZERO
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
