use crate::contact::find_contact;
use crate::math::{lerp, Angle};
use crate::shape::ShapePoly;
use glam::{Affine2, Vec2};
use std::ops::{Add, AddAssign};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

impl Default for BodyHandle {
    // default to invalid value
    fn default() -> Self {
        Self(u32::MAX)
    }
}

/// Kinematic snapshot of a body at one instant. Replaced wholesale, never
/// mutated field by field.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DynamicState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub orientation: Angle,
    pub angular_velocity: f32,
}

/// Accumulated correction for one body from one sub-step's collision pass.
///
/// Impacts from different pairs combine by component-wise addition, so the
/// order pairs are evaluated in does not matter.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Impact {
    pub delta_position: Vec2,
    pub delta_velocity: Vec2,
    pub delta_angular_velocity: f32,
}

impl Impact {
    pub const ZERO: Impact = Impact {
        delta_position: Vec2::ZERO,
        delta_velocity: Vec2::ZERO,
        delta_angular_velocity: 0.0,
    };
}

impl Add for Impact {
    type Output = Impact;

    fn add(self, rhs: Impact) -> Impact {
        Impact {
            delta_position: self.delta_position + rhs.delta_position,
            delta_velocity: self.delta_velocity + rhs.delta_velocity,
            delta_angular_velocity: self.delta_angular_velocity + rhs.delta_angular_velocity,
        }
    }
}

impl AddAssign for Impact {
    fn add_assign(&mut self, rhs: Impact) {
        *self = *self + rhs;
    }
}

// contact points closer than this produce no usable normal
const DEGENERATE_NORMAL_SQ: f32 = 1e-8;

#[derive(Clone, Debug)]
pub struct Body {
    shape: Arc<ShapePoly>,
    mass: f32,
    inv_mass: f32,
    ang_mass: f32,
    inv_ang_mass: f32,
    elasticity: f32,
    layer: u32,
    state: DynamicState,
    world_verts: Vec<Vec2>,
    prev_state: DynamicState,
    prev_world_verts: Vec<Vec2>,
}

impl Body {
    /// A zero-mass (immovable) body at the origin with unit elasticity.
    pub fn from_shape(shape: Arc<ShapePoly>) -> Self {
        let world_verts = shape.vertices().to_vec();
        Body {
            shape,
            mass: 0.0,
            inv_mass: 0.0,
            ang_mass: 0.0,
            inv_ang_mass: 0.0,
            elasticity: 1.0,
            layer: 0,
            state: DynamicState::default(),
            prev_world_verts: world_verts.clone(),
            world_verts,
            prev_state: DynamicState::default(),
        }
    }

    /// Sets the body's mass; the sign is discarded and zero mass makes the
    /// body immovable. Rotational inertia is derived from the shape, so a
    /// degenerate shape yields a body that translates but never spins.
    pub fn with_mass(mut self, raw_mass: f32) -> Self {
        let mass = raw_mass.abs();
        self.mass = mass;
        if mass == 0.0 {
            self.inv_mass = 0.0;
            self.ang_mass = 0.0;
            self.inv_ang_mass = 0.0;
        } else {
            self.inv_mass = mass.recip();
            self.ang_mass = mass * self.shape.moment_of_inertia();
            self.inv_ang_mass = if self.ang_mass == 0.0 {
                0.0
            } else {
                self.ang_mass.recip()
            };
        }
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity.clamp(0.0, 1.0);
        self
    }

    pub fn with_state(mut self, state: DynamicState) -> Self {
        self.set_state(state);
        self
    }

    pub fn with_position(mut self, position: Vec2, orientation: Angle) -> Self {
        let mut state = self.state;
        state.position = position;
        state.orientation = orientation;
        self.set_state(state);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2, angular_velocity: f32) -> Self {
        // velocity does not feed the vertex cache, no geometry rebuild
        self.state.velocity = velocity;
        self.state.angular_velocity = angular_velocity;
        self
    }

    /// Swaps the shape, recomputing rotational inertia for the existing mass
    /// and the vertex caches for the existing state.
    pub fn with_shape(mut self, shape: Arc<ShapePoly>) -> Self {
        self.shape = shape;
        let mass = self.mass;
        let mut body = self.with_mass(mass);
        let state = body.state;
        body.set_state(state);
        let prev = body.prev_state;
        body.prev_world_verts.clear();
        let tx = Affine2::from_angle_translation(prev.orientation.as_radians(), prev.position);
        body.prev_world_verts
            .extend(body.shape.vertices().iter().map(|v| tx.transform_point2(*v)));
        body
    }

    pub fn with_collision_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// The one mutator that touches position or orientation: the world-space
    /// vertex cache is rebuilt here and nowhere else, so cache and state can
    /// never disagree.
    fn set_state(&mut self, state: DynamicState) {
        let tx = Affine2::from_angle_translation(state.orientation.as_radians(), state.position);
        self.world_verts.clear();
        self.world_verts
            .extend(self.shape.vertices().iter().map(|v| tx.transform_point2(*v)));
        self.state = state;
    }

    pub fn move_by(&mut self, delta_position: Vec2, delta_angle: Angle) {
        let mut state = self.state;
        state.position += delta_position;
        state.orientation = state.orientation + delta_angle;
        self.set_state(state);
    }

    pub fn nudge(&mut self, delta_velocity: Vec2, delta_angular_velocity: f32) {
        self.state.velocity += delta_velocity;
        self.state.angular_velocity += delta_angular_velocity;
    }

    /// Semi-implicit Euler step: the current (post-correction) velocities
    /// carry the state forward.
    pub fn integrate(&mut self, delta_seconds: f32) {
        self.move_by(
            self.state.velocity * delta_seconds,
            Angle::from_radians(self.state.angular_velocity * delta_seconds),
        );
    }

    /// Copies current state and geometry into the previous-state slots.
    /// Called once per sub-step, before corrections and integration.
    pub fn shift(&mut self) {
        self.prev_state = self.state;
        self.prev_world_verts.clone_from(&self.world_verts);
    }

    pub fn shape(&self) -> &Arc<ShapePoly> {
        &self.shape
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn ang_mass(&self) -> f32 {
        self.ang_mass
    }

    pub fn inv_ang_mass(&self) -> f32 {
        self.inv_ang_mass
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    pub fn collision_layer(&self) -> u32 {
        self.layer
    }

    pub fn state(&self) -> DynamicState {
        self.state
    }

    pub fn prev_state(&self) -> DynamicState {
        self.prev_state
    }

    pub fn world_verts(&self) -> &[Vec2] {
        &self.world_verts
    }

    pub fn has_infinite_mass(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Position blended between the previous and current resolved states,
    /// `t` in `[0, 1]`.
    pub fn position(&self, t: f32) -> Vec2 {
        self.prev_state.position.lerp(self.state.position, t)
    }

    pub fn orientation(&self, t: f32) -> Angle {
        self.prev_state.orientation.lerp(self.state.orientation, t)
    }

    pub fn velocity(&self, t: f32) -> Vec2 {
        self.prev_state.velocity.lerp(self.state.velocity, t)
    }

    pub fn angular_velocity(&self, t: f32) -> f32 {
        lerp(
            self.prev_state.angular_velocity,
            self.state.angular_velocity,
            t,
        )
    }

    /// Interpolated local-to-world transform, for sampling render state
    /// between simulation steps.
    pub fn transform(&self, t: f32) -> Affine2 {
        Affine2::from_angle_translation(self.orientation(t).as_radians(), self.position(t))
    }

    /// Impulse response between two bodies.
    ///
    /// Returns `None` when no interaction is possible or relevant: bounding
    /// circles apart, both bodies immovable, no contact, or a degenerate
    /// contact normal. Otherwise one [`Impact`] per body, in argument order.
    ///
    /// Approaching contacts get an impulse that couples the linear and
    /// angular terms through the inverse masses; receding-but-overlapping
    /// contacts get a pure positional separation split by inverse mass.
    pub fn collision_response(
        restitution_scale: f32,
        body_a: &Body,
        body_b: &Body,
    ) -> Option<(Impact, Impact)> {
        let total_inv_mass = body_a.inv_mass + body_b.inv_mass;

        let max_dist = body_a.shape.max_radius() + body_b.shape.max_radius();
        let centre_delta = body_a.state.position - body_b.state.position;
        if centre_delta.length_squared() > max_dist * max_dist || total_inv_mass == 0.0 {
            return None;
        }

        let contact = find_contact(&body_a.world_verts, &body_b.world_verts)?;

        let n = contact.point_a - contact.point_b;
        let arm_a = contact.point_a - body_a.state.position;
        let arm_b = contact.point_b - body_b.state.position;

        // velocity of the contact point on each body, relative
        let vab = body_a.state.velocity + arm_a.perp() * body_a.state.angular_velocity
            - body_b.state.velocity
            - arm_b.perp() * body_b.state.angular_velocity;
        let d = vab.dot(n);

        if d < 0.0 {
            // receding but still overlapping: separate positionally, split
            // by inverse mass, leave velocities alone
            let impact_a = Impact {
                delta_position: -n * (body_a.inv_mass / total_inv_mass),
                ..Impact::ZERO
            };
            let impact_b = Impact {
                delta_position: n * (body_b.inv_mass / total_inv_mass),
                ..Impact::ZERO
            };
            return Some((impact_a, impact_b));
        }

        let n_len_sq = n.length_squared();
        if n_len_sq < DEGENERATE_NORMAL_SQ {
            return None;
        }

        let torque_arm_a = arm_a.perp_dot(n);
        let torque_arm_b = arm_b.perp_dot(n);

        let elasticity = restitution_scale * body_a.elasticity * body_b.elasticity;
        let impulse = (1.0 + elasticity) * d
            / (total_inv_mass * n_len_sq
                + body_a.inv_ang_mass * torque_arm_a * torque_arm_a
                + body_b.inv_ang_mass * torque_arm_b * torque_arm_b);

        let impact_a = Impact {
            delta_position: Vec2::ZERO,
            delta_velocity: -n * (impulse * body_a.inv_mass),
            delta_angular_velocity: -torque_arm_a * impulse * body_a.inv_ang_mass,
        };
        let impact_b = Impact {
            delta_position: Vec2::ZERO,
            delta_velocity: n * (impulse * body_b.inv_mass),
            delta_angular_velocity: torque_arm_b * impulse * body_b.inv_ang_mass,
        };
        Some((impact_a, impact_b))
    }
}

#[derive(Clone, Debug, Default)]
pub struct BodyArena {
    bodies: Vec<Body>,
    handles: Vec<BodyHandle>,
}

impl BodyArena {
    pub fn new() -> Self {
        BodyArena {
            bodies: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Handles are the insertion index; the arena never removes bodies, so
    /// they stay valid and are never reused.
    pub fn add(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(body);
        self.handles.push(handle);
        handle
    }

    pub fn get_body(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.0 as usize]
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn iter(&self) -> core::slice::Iter<Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<Body> {
        self.bodies.iter_mut()
    }

    pub fn handles(&self) -> &[BodyHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
