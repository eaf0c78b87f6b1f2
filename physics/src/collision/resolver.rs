/*!
Discrete capsule-vs-static resolution.

The resolver is stateless: it takes the previous and desired eye positions
for one tick and returns an adjusted position plus the supporting collider,
if any. Candidates are visited in world insertion order and each hit mutates
the adjusted position cumulatively, so a corridor of boxes resolves the same
way every tick.

Per finite collider the outcome is one of:
- landing snap: feet within the band around the top while not moving up;
  the eye is snapped to `top + height` and the collider becomes the support
- depenetration push: the previous position already penetrates, so the
  capsule is pushed a fixed small distance horizontally away from the shape
- axis slide: try keeping only the X displacement, then only the Z
  displacement, else stop at the previous position

There is no continuous sweep; fast vertical motion can pass a thin surface
between ticks. The landing band absorbs that at the speeds the controller
produces (terminal velocity times the clamped tick).
*/

use log::trace;

use super::broad;
use super::settings::{
    AIRBORNE_CLEARANCE, DEPENETRATION_PUSH, GROUND_EPS, LANDING_BAND, PLATFORM_HYSTERESIS_BAND,
    STANDING_BAND,
};
use super::types::{PlayerCapsule, Resolution, StaticCollider, Support, Vec3};
use crate::world::StaticWorld;

/// Capsule position resolver over a static world.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionResolver {
    pub capsule: PlayerCapsule,
}

impl CollisionResolver {
    pub fn new(capsule: PlayerCapsule) -> Self {
        Self { capsule }
    }

    /// Resolves one tick of movement from `prev` to `desired`.
    ///
    /// `prev_support` is the support found last tick; it feeds the platform
    /// hysteresis and is carried through unchanged when there is no
    /// displacement.
    pub fn resolve(
        &self,
        world: &StaticWorld,
        prev: Vec3,
        desired: Vec3,
        prev_support: Option<Support>,
    ) -> Resolution {
        if prev == desired {
            return Resolution {
                position: desired,
                support: prev_support,
                airborne: prev_support.is_none() && self.clearly_airborne(world, desired),
            };
        }

        let swept =
            broad::swept_capsule_aabb(prev, desired, self.capsule.radius, self.capsule.height);
        let mut candidates = broad::query_candidates(world.accel(), &swept);
        candidates.extend_from_slice(&world.accel().plane_indices);
        candidates.sort_unstable();

        let mut adjusted = desired;
        let mut support: Option<Support> = None;
        for index in candidates {
            let collider = &world.colliders()[index];
            match *collider {
                StaticCollider::Plane { ground_height } => {
                    let eye_min = ground_height + self.capsule.height;
                    if eye_min - adjusted.y > GROUND_EPS {
                        adjusted.y = eye_min;
                        support = Some(Support {
                            collider: index,
                            height: ground_height,
                            is_platform: false,
                        });
                    }
                }
                _ => {
                    if let Some(sup) = self.resolve_finite(index, collider, prev, &mut adjusted) {
                        support = Some(sup);
                    }
                }
            }
        }

        // Platform hysteresis: a tick that merely crossed a platform edge
        // keeps the old support instead of dropping the player.
        if support.is_none() {
            if let Some(prev_sup) = prev_support {
                let feet = adjusted.y - self.capsule.height;
                if prev_sup.is_platform
                    && (feet - prev_sup.height).abs() < PLATFORM_HYSTERESIS_BAND
                {
                    trace!(
                        "hysteresis re-snap to platform {} at height {}",
                        prev_sup.collider, prev_sup.height
                    );
                    adjusted.y = prev_sup.height + self.capsule.height;
                    support = Some(prev_sup);
                }
            }
        }

        Resolution {
            position: adjusted,
            support,
            airborne: support.is_none() && self.clearly_airborne(world, adjusted),
        }
    }

    /// Ground sensor for a stationary query: the first collider (in
    /// insertion order) currently supporting `position`, if any.
    pub fn ground_support(&self, world: &StaticWorld, position: Vec3) -> Option<Support> {
        let feet = position.y - self.capsule.height;
        for (index, collider) in world.colliders().iter().enumerate() {
            match *collider {
                StaticCollider::Plane { ground_height } => {
                    if (position.y - (ground_height + self.capsule.height)).abs() < GROUND_EPS {
                        return Some(Support {
                            collider: index,
                            height: ground_height,
                            is_platform: false,
                        });
                    }
                }
                _ => {
                    if self.contained(collider, position)
                        && (feet - collider.top()).abs() < STANDING_BAND
                    {
                        return Some(Support {
                            collider: index,
                            height: collider.top(),
                            is_platform: true,
                        });
                    }
                }
            }
        }
        None
    }

    /// Resolves the adjusted position against one box or prism. Returns the
    /// support record when the outcome is a landing.
    fn resolve_finite(
        &self,
        index: usize,
        collider: &StaticCollider,
        prev: Vec3,
        adjusted: &mut Vec3,
    ) -> Option<Support> {
        let descending = adjusted.y <= prev.y;
        if descending && self.in_landing_band(collider, *adjusted) {
            adjusted.y = collider.top() + self.capsule.height;
            return Some(Support {
                collider: index,
                height: collider.top(),
                is_platform: true,
            });
        }

        if !self.blocking(collider, *adjusted) {
            return None;
        }

        if self.blocking(collider, prev) {
            // Already inside last tick: push out horizontally, a little at a time.
            let (cx, cz, _, _) = collider.footprint().unwrap_or((0.0, 0.0, 0.0, 0.0));
            let away = Vec3::new(prev.x - cx, 0.0, prev.z - cz);
            let dir = if away.norm() > 1.0e-6 {
                away.normalize()
            } else {
                Vec3::x()
            };
            trace!("depenetration push away from collider {index}");
            *adjusted = prev + dir * DEPENETRATION_PUSH;
            return None;
        }

        // Axis-decomposed slide: X displacement only, then Z only, else stop.
        let x_only = Vec3::new(adjusted.x, prev.y, prev.z);
        if !self.blocking(collider, x_only) {
            *adjusted = x_only;
            return None;
        }
        let z_only = Vec3::new(prev.x, prev.y, adjusted.z);
        if !self.blocking(collider, z_only) {
            *adjusted = z_only;
            return None;
        }
        *adjusted = prev;
        None
    }

    /// Horizontal containment in the collider footprint expanded by the
    /// capsule radius.
    fn contained(&self, collider: &StaticCollider, position: Vec3) -> bool {
        match collider.footprint() {
            Some((cx, cz, hx, hz)) => {
                (position.x - cx).abs() <= hx + self.capsule.radius
                    && (position.z - cz).abs() <= hz + self.capsule.radius
            }
            None => false,
        }
    }

    /// Solid overlap: contained, with the feet below the landing band and
    /// the head above the collider bottom.
    fn blocking(&self, collider: &StaticCollider, position: Vec3) -> bool {
        if !self.contained(collider, position) {
            return false;
        }
        let feet = position.y - self.capsule.height;
        feet < collider.top() - LANDING_BAND && position.y > collider.bottom()
    }

    /// Feet within the band around the collider top, horizontally contained.
    fn in_landing_band(&self, collider: &StaticCollider, position: Vec3) -> bool {
        if !self.contained(collider, position) {
            return false;
        }
        let feet = position.y - self.capsule.height;
        (feet - collider.top()).abs() <= LANDING_BAND
    }

    fn clearly_airborne(&self, world: &StaticWorld, position: Vec3) -> bool {
        position.y - self.capsule.height > world.ground_height() + AIRBORNE_CLEARANCE
    }
}
