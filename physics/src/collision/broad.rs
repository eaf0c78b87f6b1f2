/*!
Broad phase: world-space AABBs and swept-volume candidate pruning.

Finite colliders get one world-space AABB each, built once when the static
world is constructed. A resolve query computes the AABB swept by the capsule
over the tick and collects the finite colliders whose boxes it touches;
infinite planes are tracked separately and always participate.

A linear scan over the boxes is deliberate. Static worlds here are a few
dozen colliders, and resolution order must follow world insertion order, so
the candidate list is kept sorted by collider index.
*/

use super::settings;
use super::types::{StaticCollider, Vec3};

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(mins: Vec3, maxs: Vec3) -> Self {
        Self { mins, maxs }
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// Box grown by `margin` on every axis.
    #[inline]
    pub fn inflate(&self, margin: f32) -> Aabb {
        let m = Vec3::new(margin, margin, margin);
        Aabb {
            mins: self.mins - m,
            maxs: self.maxs + m,
        }
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.mins.x <= other.maxs.x
            && self.maxs.x >= other.mins.x
            && self.mins.y <= other.maxs.y
            && self.maxs.y >= other.mins.y
            && self.mins.z <= other.maxs.z
            && self.maxs.z >= other.mins.z
    }
}

/// Precomputed query structure over a static collider list.
///
/// `aabbs` is parallel to `finite_indices`; planes have no finite bounds and
/// are listed in `plane_indices` instead.
#[derive(Clone, Debug, Default)]
pub struct WorldAccel {
    pub aabbs: Vec<Aabb>,
    pub finite_indices: Vec<usize>,
    pub plane_indices: Vec<usize>,
}

/// Builds the accelerator for `colliders`, preserving insertion order.
pub fn build_world_accel(colliders: &[StaticCollider]) -> WorldAccel {
    let mut accel = WorldAccel::default();
    for (index, collider) in colliders.iter().enumerate() {
        match collider_aabb(collider) {
            Some(aabb) => {
                accel.aabbs.push(aabb);
                accel.finite_indices.push(index);
            }
            None => accel.plane_indices.push(index),
        }
    }
    accel
}

/// World-space bounds of a finite collider, `None` for planes.
fn collider_aabb(collider: &StaticCollider) -> Option<Aabb> {
    let (cx, cz, hx, hz) = collider.footprint()?;
    Some(Aabb::new(
        Vec3::new(cx - hx, collider.bottom(), cz - hz),
        Vec3::new(cx + hx, collider.top(), cz + hz),
    ))
}

/// AABB of the capsule at `position` (eye at `position.y`).
#[inline]
pub fn capsule_aabb(position: Vec3, radius: f32, height: f32) -> Aabb {
    Aabb::new(
        Vec3::new(position.x - radius, position.y - height, position.z - radius),
        Vec3::new(position.x + radius, position.y, position.z + radius),
    )
}

/// AABB covering the capsule at both endpoints of a tick's displacement,
/// inflated by the landing band so band-only contacts are not pruned away.
pub fn swept_capsule_aabb(prev: Vec3, desired: Vec3, radius: f32, height: f32) -> Aabb {
    capsule_aabb(prev, radius, height)
        .union(&capsule_aabb(desired, radius, height))
        .inflate(settings::LANDING_BAND)
}

/// Finite-collider indices whose bounds touch `query`, in ascending
/// (insertion) order.
pub fn query_candidates(accel: &WorldAccel, query: &Aabb) -> Vec<usize> {
    accel
        .finite_indices
        .iter()
        .zip(accel.aabbs.iter())
        .filter(|(_, aabb)| aabb.intersects(query))
        .map(|(&index, _)| index)
        .collect()
}
