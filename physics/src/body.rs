/*!
Dynamic rigid bodies: force accumulation and semi-implicit integration.

Bodies are deliberately simple. Rotation is not simulated; a body is a
position, a velocity, an accumulated force and a shape used for coarse
contact radii. Immovable bodies participate in collision as obstacles but
never move, accelerate or accumulate force.
*/

use crate::collision::types::Vec3;

/// Speed below which a body is snapped to rest after integration. Stops
/// friction from producing an endless sub-millimeter crawl.
pub const REST_SPEED: f32 = 0.01;

/// Coarse collision shape of a dynamic body.
#[derive(Clone, Copy, Debug)]
pub enum BodyShape {
    /// Axis-aligned box; position is the center.
    Cuboid { half_extents: Vec3 },
    /// Triangular prism on a square footprint; position is the base center.
    TriPrism { half_size: f32, height: f32 },
    /// Sphere; position is the center.
    Sphere { radius: f32 },
}

impl BodyShape {
    /// Radius used for pairwise contact: half the bounding-box diagonal for
    /// boxes, the footprint half size for prisms, the radius for spheres.
    #[inline]
    pub fn collision_radius(&self) -> f32 {
        match *self {
            BodyShape::Cuboid { half_extents } => half_extents.norm(),
            BodyShape::TriPrism { half_size, .. } => half_size,
            BodyShape::Sphere { radius } => radius,
        }
    }

    /// Height of the position reference above a surface the body rests on.
    #[inline]
    pub fn resting_offset(&self) -> f32 {
        match *self {
            BodyShape::Cuboid { half_extents } => half_extents.y,
            BodyShape::TriPrism { .. } => 0.0,
            BodyShape::Sphere { radius } => radius,
        }
    }

    /// Horizontal half extents `(x, z)` of the footprint.
    #[inline]
    pub fn horizontal_half_extents(&self) -> (f32, f32) {
        match *self {
            BodyShape::Cuboid { half_extents } => (half_extents.x, half_extents.z),
            BodyShape::TriPrism { half_size, .. } => (half_size, half_size),
            BodyShape::Sphere { radius } => (radius, radius),
        }
    }
}

/// A single simulated rigid body.
#[derive(Clone, Copy, Debug)]
pub struct DynamicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Force accumulated since the last integration step.
    pub force: Vec3,
    /// Mass in kilograms; must be positive.
    pub mass: f32,
    /// Linear drag coefficient in `[0, 1]`.
    pub friction: f32,
    /// Immovable bodies are obstacles only.
    pub movable: bool,
    pub shape: BodyShape,
}

impl DynamicBody {
    pub fn new(shape: BodyShape, position: Vec3, mass: f32, friction: f32, movable: bool) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            mass,
            friction,
            movable,
            shape,
        }
    }

    /// Accumulates a force for the next integration. No-op when immovable.
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        if self.movable {
            self.force += force;
        }
    }

    /// One explicit integration step: acceleration from the accumulated
    /// force, linear drag, rest snapping, then position. Clears the force.
    pub fn integrate(&mut self, dt: f32) {
        if !self.movable {
            return;
        }
        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.velocity += -self.friction * self.velocity * dt;
        if self.velocity.norm() < REST_SPEED {
            self.velocity = Vec3::zeros();
        }
        self.position += self.velocity * dt;
        self.force = Vec3::zeros();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube(movable: bool) -> DynamicBody {
        DynamicBody::new(
            BodyShape::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            Vec3::new(0.0, 0.5, 0.0),
            10.0,
            0.5,
            movable,
        )
    }

    #[test]
    fn force_integrates_to_velocity_and_position() {
        let mut body = unit_cube(true);
        body.apply_force(Vec3::new(100.0, 0.0, 0.0));
        body.integrate(0.1);
        // a = 10, v = 1.0 then drag: v += -0.5 * 1.0 * 0.1 = 0.95
        assert!((body.velocity.x - 0.95).abs() < 1.0e-6);
        assert!((body.position.x - 0.095).abs() < 1.0e-6);
        // Accumulated force is consumed by the step.
        assert!(body.force.norm() < 1.0e-6);
    }

    #[test]
    fn friction_decays_velocity_to_rest() {
        let mut body = unit_cube(true);
        body.velocity = Vec3::new(0.2, 0.0, 0.0);
        for _ in 0..200 {
            body.integrate(0.05);
        }
        assert!(body.velocity.norm() < 1.0e-6);
    }

    #[test]
    fn sub_rest_speed_snaps_to_zero() {
        let mut body = unit_cube(true);
        body.velocity = Vec3::new(0.009, 0.0, 0.0);
        let before = body.position;
        body.integrate(0.016);
        assert!(body.velocity.norm() < 1.0e-6);
        assert!((body.position - before).norm() < 1.0e-6);
    }

    #[test]
    fn immovable_bodies_ignore_forces_and_integration() {
        let mut body = unit_cube(false);
        body.apply_force(Vec3::new(1000.0, 0.0, 0.0));
        body.integrate(0.1);
        assert!(body.force.norm() < 1.0e-6);
        assert!(body.velocity.norm() < 1.0e-6);
        assert!((body.position - Vec3::new(0.0, 0.5, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn collision_radius_per_shape() {
        let cube = BodyShape::Cuboid {
            half_extents: Vec3::new(1.0, 2.0, 2.0),
        };
        assert!((cube.collision_radius() - 3.0).abs() < 1.0e-6);
        let prism = BodyShape::TriPrism {
            half_size: 0.7,
            height: 1.0,
        };
        assert!((prism.collision_radius() - 0.7).abs() < 1.0e-6);
        let sphere = BodyShape::Sphere { radius: 0.4 };
        assert!((sphere.collision_radius() - 0.4).abs() < 1.0e-6);
    }
}
