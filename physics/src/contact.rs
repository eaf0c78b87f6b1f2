/*!
Rigid-body contact pass: world support, pairwise impulses, recovery.

`step_bodies` runs once per tick after the character step, in a fixed order:
recovery of escaped bodies, resting/gravity against the static world,
pairwise separation and impulses, then integration. Pairwise contact is
coarse and radius-based; shapes only contribute their contact radius and
resting offset.
*/

use log::debug;

use crate::body::{BodyShape, DynamicBody};
use crate::collision::types::{StaticCollider, Vec3};
use crate::world::StaticWorld;

/// Half-width of the resting band around a support height. A body within
/// the band is clamped onto the surface with zero vertical velocity.
pub const REST_BAND: f32 = 0.1;

/// Bodies below this height have escaped the world and are recovered.
pub const FLOOR_LIMIT_Y: f32 = -10.0;

/// Height an escaped body is teleported back to.
pub const RESPAWN_HEIGHT: f32 = 5.0;

/// Restitution for box/prism contacts.
pub const RESTITUTION_SOFT: f32 = 0.3;

/// Restitution when either body of a pair is a sphere.
pub const RESTITUTION_BOUNCY: f32 = 0.8;

/// One contact-and-integration pass over all bodies.
pub fn step_bodies(bodies: &mut [DynamicBody], world: &StaticWorld, gravity: f32, dt: f32) {
    for body in bodies.iter_mut() {
        if !body.movable {
            continue;
        }
        if body.position.y < FLOOR_LIMIT_Y {
            debug!(
                "body below floor limit at y {:.2}, recovering",
                body.position.y
            );
            body.position.y = RESPAWN_HEIGHT;
            body.velocity = Vec3::zeros();
            body.force = Vec3::zeros();
            continue;
        }
        match support_height(world, body) {
            Some(rest_y) => {
                body.position.y = rest_y;
                body.velocity.y = 0.0;
            }
            None => {
                body.apply_force(Vec3::new(0.0, -gravity * body.mass, 0.0));
            }
        }
    }

    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            resolve_pair(a, b);
        }
    }

    for body in bodies.iter_mut() {
        body.integrate(dt);
    }
}

/// Resting height for `body` against the static world, if it is within the
/// rest band of a surface: planes first by insertion order, then the tops of
/// boxes and prisms the body's footprint overlaps.
pub fn support_height(world: &StaticWorld, body: &DynamicBody) -> Option<f32> {
    let offset = body.shape.resting_offset();
    let (bhx, bhz) = body.shape.horizontal_half_extents();
    for collider in world.colliders() {
        match *collider {
            StaticCollider::Plane { ground_height } => {
                let rest = ground_height + offset;
                if (body.position.y - rest).abs() < REST_BAND {
                    return Some(rest);
                }
            }
            _ => {
                let Some((cx, cz, hx, hz)) = collider.footprint() else {
                    continue;
                };
                let contained = (body.position.x - cx).abs() <= hx + bhx
                    && (body.position.z - cz).abs() <= hz + bhz;
                let rest = collider.top() + offset;
                if contained && (body.position.y - rest).abs() < REST_BAND {
                    return Some(rest);
                }
            }
        }
    }
    None
}

/// Separates and applies an impulse to one body pair when their contact
/// radii overlap. Immovable bodies absorb neither displacement nor impulse.
pub fn resolve_pair(a: &mut DynamicBody, b: &mut DynamicBody) {
    if !a.movable && !b.movable {
        return;
    }
    let threshold = a.shape.collision_radius() + b.shape.collision_radius();
    let delta = b.position - a.position;
    let distance = delta.norm();
    if distance >= threshold {
        return;
    }
    let normal = if distance > 1.0e-6 {
        delta / distance
    } else {
        Vec3::x()
    };
    let overlap = threshold - distance;

    if a.movable && b.movable {
        let total = a.mass + b.mass;
        a.position -= normal * (overlap * b.mass / total);
        b.position += normal * (overlap * a.mass / total);
    } else if a.movable {
        a.position -= normal * overlap;
    } else {
        b.position += normal * overlap;
    }

    let closing = (b.velocity - a.velocity).dot(&normal);
    if closing < 0.0 {
        let restitution = pair_restitution(&a.shape, &b.shape);
        let j = -(1.0 + restitution) * closing / (1.0 / a.mass + 1.0 / b.mass);
        let impulse = normal * j;
        if a.movable {
            a.velocity -= impulse / a.mass;
        }
        if b.movable {
            b.velocity += impulse / b.mass;
        }
    }
}

#[inline]
fn pair_restitution(a: &BodyShape, b: &BodyShape) -> f32 {
    if matches!(a, BodyShape::Sphere { .. }) || matches!(b, BodyShape::Sphere { .. }) {
        RESTITUTION_BOUNCY
    } else {
        RESTITUTION_SOFT
    }
}
