/*!
Immutable static world: the collider list plus its broad-phase accelerator.

Colliders keep their insertion order; the resolver visits them in that order,
so scene authoring order is part of the simulation's observable behavior.
The world is built once and never mutated afterwards.
*/

use crate::collision::broad::{self, WorldAccel};
use crate::collision::types::StaticCollider;

/// Static collision geometry for one scene.
#[derive(Clone, Debug, Default)]
pub struct StaticWorld {
    colliders: Vec<StaticCollider>,
    accel: WorldAccel,
}

impl StaticWorld {
    /// Builds a world (and its accelerator) from an ordered collider list.
    pub fn from_colliders(colliders: Vec<StaticCollider>) -> Self {
        let accel = broad::build_world_accel(&colliders);
        Self { colliders, accel }
    }

    #[inline]
    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    #[inline]
    pub fn accel(&self) -> &WorldAccel {
        &self.accel
    }

    /// Height of the walkable floor: the lowest plane, or 0.0 without one.
    pub fn ground_height(&self) -> f32 {
        let mut ground: Option<f32> = None;
        for collider in &self.colliders {
            if let StaticCollider::Plane { ground_height } = *collider {
                ground = Some(match ground {
                    Some(g) => g.min(ground_height),
                    None => ground_height,
                });
            }
        }
        ground.unwrap_or(0.0)
    }
}
