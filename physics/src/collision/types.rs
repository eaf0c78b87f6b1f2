/*!
Plain data for the collision pipeline: the collider shapes a static world
is authored with, the player capsule dimensions, and the support records
the resolver hands back to the character controller. The queries that
consume these live in `broad` and `resolver`.
*/

use nalgebra as na;

/// Common math alias for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;

/// Capsule dimensions for the player controller.
///
/// `height` is the distance from the feet to the eye; the controller's
/// position is the eye, so feet are at `position.y - height`. `radius`
/// inflates static footprints horizontally during queries.
#[derive(Clone, Copy, Debug)]
pub struct PlayerCapsule {
    pub radius: f32,
    pub height: f32,
}

impl Default for PlayerCapsule {
    fn default() -> Self {
        Self {
            radius: super::settings::PLAYER_RADIUS,
            height: super::settings::PLAYER_HEIGHT,
        }
    }
}

/// Static collision shapes supported by the world.
///
/// - Plane: infinite horizontal ground plane at `ground_height`.
/// - Cuboid: axis-aligned box given by its center and half extents.
/// - TriPrism: triangular prism standing on a square footprint;
///   `base_center.y` is the bottom, the apex sits at `base_center.y + height`.
#[derive(Clone, Copy, Debug)]
pub enum StaticCollider {
    Plane {
        /// Height of the walkable surface (meters, world Y).
        ground_height: f32,
    },
    Cuboid {
        /// World-space center of the box.
        center: Vec3,
        /// Half extents (hx, hy, hz).
        half_extents: Vec3,
    },
    TriPrism {
        /// World-space center of the base footprint; `y` is the bottom.
        base_center: Vec3,
        /// Half the side length of the square base footprint.
        half_size: f32,
        /// Height from base to apex.
        height: f32,
    },
}

impl StaticCollider {
    /// Height of the top surface (the apex for prisms, `ground_height` for planes).
    #[inline]
    pub fn top(&self) -> f32 {
        match *self {
            StaticCollider::Plane { ground_height } => ground_height,
            StaticCollider::Cuboid {
                center,
                half_extents,
            } => center.y + half_extents.y,
            StaticCollider::TriPrism {
                base_center,
                height,
                ..
            } => base_center.y + height,
        }
    }

    /// Height of the bottom surface. Planes have no extent below the surface.
    #[inline]
    pub fn bottom(&self) -> f32 {
        match *self {
            StaticCollider::Plane { ground_height } => ground_height,
            StaticCollider::Cuboid {
                center,
                half_extents,
            } => center.y - half_extents.y,
            StaticCollider::TriPrism { base_center, .. } => base_center.y,
        }
    }

    /// Horizontal footprint as `(center_x, center_z, half_x, half_z)`,
    /// or `None` for infinite planes.
    #[inline]
    pub fn footprint(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            StaticCollider::Plane { .. } => None,
            StaticCollider::Cuboid {
                center,
                half_extents,
            } => Some((center.x, center.z, half_extents.x, half_extents.z)),
            StaticCollider::TriPrism {
                base_center,
                half_size,
                ..
            } => Some((base_center.x, base_center.z, half_size, half_size)),
        }
    }
}

/// Which static collider currently supports the player, and at what height.
///
/// This is the contact record produced by a resolve or ground-sense query.
/// It is recomputed every tick; the only cross-tick use is as the
/// "previous standing" hint for platform-edge hysteresis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Support {
    /// Index of the supporting collider in world insertion order.
    pub collider: usize,
    /// Height of the supporting top surface (meters, world Y).
    pub height: f32,
    /// True for box/prism platforms, false for ground planes.
    pub is_platform: bool,
}

/// Result of a single resolve query.
#[derive(Clone, Copy, Debug)]
pub struct Resolution {
    /// Final (adjusted) eye position after resolution.
    pub position: Vec3,
    /// Supporting collider, if the query found one.
    pub support: Option<Support>,
    /// True when the position is clearly above floor level with no support.
    pub airborne: bool,
}
