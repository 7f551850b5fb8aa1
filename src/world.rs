use crate::body::{Body, BodyArena, BodyHandle, Impact};
use crate::math::Angle;
use crate::time_accumulator::TimeAccumulator;

/// Fraction of the accumulated positional correction applied per sub-step.
/// Softens penetration resolution to avoid overshoot and jitter.
const POSITION_BIAS: f32 = 0.3;

/// The simulation: an append-only body collection plus the fixed-step
/// accumulator that drives it.
#[derive(Clone, Debug)]
pub struct World {
    bodies: BodyArena,
    accumulator: TimeAccumulator,
}

impl World {
    pub fn new(fixed_step: f32, max_step: f32) -> Self {
        World {
            bodies: BodyArena::new(),
            accumulator: TimeAccumulator::new(fixed_step, max_step),
        }
    }

    /// Registers a batch of bodies, returning their handles in input order.
    /// Handles are contiguous and ascending from the world's current count.
    pub fn add_bodies(&mut self, bodies: Vec<Body>) -> Vec<BodyHandle> {
        bodies
            .into_iter()
            .map(|body| self.bodies.add(body))
            .collect()
    }

    /// Advances the simulation by `elapsed` seconds' worth of fixed
    /// sub-steps; any remainder is banked for the next call.
    pub fn advance(&mut self, elapsed: f32) {
        let num_steps = self.accumulator.advance(elapsed);
        let delta_seconds = self.accumulator.time_step();
        for _ in 0..num_steps {
            self.sub_step(delta_seconds);
        }
    }

    /// One fixed sub-step. The sequence is an ordering invariant:
    /// shift, then detect against the shifted snapshot, then apply the
    /// accumulated corrections, then integrate. Integrating earlier would
    /// let bodies interpenetrate uncorrected for a step.
    fn sub_step(&mut self, delta_seconds: f32) {
        for body in self.bodies.iter_mut() {
            body.shift();
        }

        // exhaustive pairwise scan over the snapshot; impacts from separate
        // pairs sum per body
        let snapshot = self.bodies.as_slice();
        let mut impacts = vec![Impact::ZERO; snapshot.len()];
        for i in 0..snapshot.len() {
            for j in (i + 1)..snapshot.len() {
                if let Some((impact_i, impact_j)) =
                    Body::collision_response(1.0, &snapshot[i], &snapshot[j])
                {
                    impacts[i] += impact_i;
                    impacts[j] += impact_j;
                }
            }
        }

        for (body, impact) in self.bodies.iter_mut().zip(impacts) {
            if impact == Impact::ZERO {
                continue;
            }
            body.nudge(impact.delta_velocity, impact.delta_angular_velocity);
            // penetration correction is deliberately partial; orientation is
            // never corrected positionally
            body.move_by(impact.delta_position * POSITION_BIAS, Angle::ZERO);
        }

        for body in self.bodies.iter_mut() {
            body.integrate(delta_seconds);
        }
    }

    pub fn get_body(&self, handle: BodyHandle) -> &Body {
        self.bodies.get_body(handle)
    }

    pub fn handles(&self) -> &[BodyHandle] {
        self.bodies.handles()
    }

    pub fn iter_bodies(&self) -> core::slice::Iter<Body> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapePoly;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;
    use std::sync::Arc;

    fn vertical_segment(half: f32) -> Arc<ShapePoly> {
        Arc::new(ShapePoly::new(&[Vec2::new(0.0, -half), Vec2::new(0.0, half)]))
    }

    fn horizontal_segment(half: f32) -> Arc<ShapePoly> {
        Arc::new(ShapePoly::new(&[Vec2::new(-half, 0.0), Vec2::new(half, 0.0)]))
    }

    #[test]
    fn handles_are_contiguous_per_batch() {
        let shape = Arc::new(ShapePoly::make_box(1.0, 1.0));
        let mut world = World::new(0.01, 0.1);

        let first = world.add_bodies(vec![
            Body::from_shape(shape.clone()),
            Body::from_shape(shape.clone()),
        ]);
        assert_eq!(first, vec![BodyHandle(0), BodyHandle(1)]);

        let second = world.add_bodies(vec![
            Body::from_shape(shape.clone()),
            Body::from_shape(shape.clone()),
            Body::from_shape(shape),
        ]);
        assert_eq!(second, vec![BodyHandle(2), BodyHandle(3), BodyHandle(4)]);
        assert_eq!(world.len(), 5);
    }

    #[test]
    fn advance_banks_partial_steps() {
        let shape = Arc::new(ShapePoly::make_box(1.0, 1.0));
        let mut world = World::new(0.25, 10.0);
        let handles = world.add_bodies(vec![Body::from_shape(shape)
            .with_mass(1.0)
            .with_velocity(Vec2::new(1.0, 0.0), 0.0)]);

        world.advance(0.125);
        assert_eq!(world.get_body(handles[0]).state().position, Vec2::ZERO);

        world.advance(0.125);
        let pos = world.get_body(handles[0]).state().position;
        assert!(pos.abs_diff_eq(Vec2::new(0.25, 0.0), 1e-6));
    }

    #[test]
    fn head_on_approach_then_elastic_exchange() {
        // crossed segments (zero rotational inertia) 0.5 apart, closing at
        // 2 units/s along x
        let mut world = World::new(0.01, 1.0);
        let handles = world.add_bodies(vec![
            Body::from_shape(vertical_segment(0.1))
                .with_mass(1.0)
                .with_elasticity(1.0)
                .with_position(Vec2::new(-0.25, 0.0), Angle::ZERO)
                .with_velocity(Vec2::new(1.0, 0.0), 0.0),
            Body::from_shape(horizontal_segment(0.1))
                .with_mass(1.0)
                .with_elasticity(1.0)
                .with_position(Vec2::new(0.25, 0.0), Angle::ZERO)
                .with_velocity(Vec2::new(-1.0, 0.0), 0.0),
        ]);

        // far apart: one sub-step of plain motion, no premature impulse
        world.advance(0.01);
        let a = world.get_body(handles[0]);
        let b = world.get_body(handles[1]);
        assert!(a.state().position.abs_diff_eq(Vec2::new(-0.24, 0.0), 1e-6));
        assert!(b.state().position.abs_diff_eq(Vec2::new(0.24, 0.0), 1e-6));
        assert_eq!(a.state().velocity, Vec2::new(1.0, 0.0));
        assert_eq!(b.state().velocity, Vec2::new(-1.0, 0.0));

        // enough steps to reach contact and bounce
        for _ in 0..29 {
            world.advance(0.01);
        }
        let a = world.get_body(handles[0]);
        let b = world.get_body(handles[1]);
        assert!(
            a.state().velocity.abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-3),
            "a velocity = {}",
            a.state().velocity
        );
        assert!(
            b.state().velocity.abs_diff_eq(Vec2::new(1.0, 0.0), 1e-3),
            "b velocity = {}",
            b.state().velocity
        );
        // separating again
        assert!(b.state().position.x - a.state().position.x > 0.1);
    }

    #[test]
    fn receding_overlap_gets_biased_position_nudge() {
        // overlapping and receding: velocities untouched, positions nudged
        // by 0.3 of the distributed separation
        let mut world = World::new(0.01, 1.0);
        let handles = world.add_bodies(vec![
            Body::from_shape(vertical_segment(1.0))
                .with_mass(1.0)
                .with_position(Vec2::new(-0.05, 0.0), Angle::ZERO)
                .with_velocity(Vec2::new(-1.0, 0.0), 0.0),
            Body::from_shape(horizontal_segment(1.0))
                .with_mass(1.0)
                .with_position(Vec2::new(0.05, 0.0), Angle::ZERO)
                .with_velocity(Vec2::new(1.0, 0.0), 0.0),
        ]);

        world.advance(0.01);

        // overlap depth 0.9, each body owed 0.45 of separation, biased to
        // 0.135, plus 0.01 of plain motion
        let a = world.get_body(handles[0]);
        let b = world.get_body(handles[1]);
        assert!(
            a.state().position.abs_diff_eq(Vec2::new(-0.195, 0.0), 1e-3),
            "a position = {}",
            a.state().position
        );
        assert!(b.state().position.abs_diff_eq(Vec2::new(0.195, 0.0), 1e-3));
        assert_eq!(a.state().velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.state().velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn advance_is_deterministic() {
        let shape = Arc::new(ShapePoly::make_box(1.0, 1.0));
        let mut rng = Pcg64Mcg::seed_from_u64(42);

        let mut world = World::new(0.02, 1.0);
        let bodies: Vec<Body> = (0..16)
            .map(|_| {
                Body::from_shape(shape.clone())
                    .with_mass(1.0)
                    .with_elasticity(rng.gen_range(0.0..1.0))
                    .with_position(
                        Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)),
                        Angle::from_radians(rng.gen_range(-3.0..3.0)),
                    )
                    .with_velocity(
                        Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)),
                        rng.gen_range(-1.0..1.0),
                    )
            })
            .collect();
        world.add_bodies(bodies);

        let mut twin = world.clone();
        for _ in 0..5 {
            world.advance(0.02);
            twin.advance(0.02);
        }

        for (a, b) in world.iter_bodies().zip(twin.iter_bodies()) {
            let sa = a.state();
            let sb = b.state();
            assert_eq!(sa.position.x.to_bits(), sb.position.x.to_bits());
            assert_eq!(sa.position.y.to_bits(), sb.position.y.to_bits());
            assert_eq!(sa.velocity.x.to_bits(), sb.velocity.x.to_bits());
            assert_eq!(sa.velocity.y.to_bits(), sb.velocity.y.to_bits());
            assert_eq!(
                sa.orientation.as_radians().to_bits(),
                sb.orientation.as_radians().to_bits()
            );
            assert_eq!(
                sa.angular_velocity.to_bits(),
                sb.angular_velocity.to_bits()
            );
        }
    }
}
