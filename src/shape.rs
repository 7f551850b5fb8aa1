use glam::Vec2;
use std::f32::consts::TAU;

/// An immutable convex polygon in its local frame.
///
/// Vertices are counter-clockwise wound around the local origin. Mass
/// properties are derived once at construction; bodies share shapes through
/// an `Arc` and never mutate them.
#[derive(Clone, Debug)]
pub struct ShapePoly {
    verts: Vec<Vec2>,
    moment_of_inertia: f32,
    max_radius: f32,
}

impl ShapePoly {
    pub fn new(verts: &[Vec2]) -> Self {
        assert!(!verts.is_empty());

        ShapePoly {
            verts: verts.to_vec(),
            moment_of_inertia: polygon_moment_per_unit_mass(verts),
            max_radius: verts.iter().map(|v| v.length()).fold(0.0, f32::max),
        }
    }

    /// Axis-aligned box centred on the local origin.
    pub fn make_box(width: f32, height: f32) -> Self {
        let w = width * 0.5;
        let h = height * 0.5;
        Self::new(&[
            Vec2::new(-w, -h),
            Vec2::new(w, -h),
            Vec2::new(w, h),
            Vec2::new(-w, h),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn make_regular(sides: usize, radius: f32) -> Self {
        assert!(sides >= 3);

        let verts: Vec<Vec2> = (0..sides)
            .map(|i| {
                let theta = TAU * i as f32 / sides as f32;
                Vec2::new(theta.cos(), theta.sin()) * radius
            })
            .collect();
        Self::new(&verts)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.verts
    }

    /// Moment of inertia about the local origin, per unit mass.
    pub fn moment_of_inertia(&self) -> f32 {
        self.moment_of_inertia
    }

    /// Radius of the bounding circle around the local origin.
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }
}

/// Second moment of area about the origin divided by the area, which is the
/// moment of inertia per unit mass for a uniform-density polygon. Degenerate
/// (zero-area) vertex lists yield zero.
fn polygon_moment_per_unit_mass(verts: &[Vec2]) -> f32 {
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        let cross = a.perp_dot(b);
        num += cross * (a.dot(a) + a.dot(b) + b.dot(b));
        den += cross;
    }

    if den.abs() <= f32::EPSILON {
        0.0
    } else {
        num / (6.0 * den)
    }
}
