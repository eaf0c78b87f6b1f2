/*!
Kinematic character and rigid-body physics for a first-person scene.

The crate is a fixed-tick simulation core with three pieces:
- a capsule character controller over static geometry (`character`,
  `collision`, `world`)
- coarse dynamic bodies with force accumulation and pairwise contact
  (`body`, `contact`)
- a facade ordering the two passes per tick (`sim`)

There is no rendering, input polling or networking here; hosts drive the
simulation with an intent vector and a tick duration and read the state
back. All units are meters, seconds and kilograms, Y up.

Diagnostics go through the `log` facade; the crate installs no logger.
*/

pub mod body;
pub mod character;
pub mod collision;
pub mod contact;
pub mod sim;
pub mod world;

pub use body::{BodyShape, DynamicBody};
pub use character::{CharacterConfig, CharacterController, PlayerState};
pub use collision::{CollisionResolver, PlayerCapsule, Resolution, StaticCollider, Support, Vec3};
pub use sim::Simulation;
pub use world::StaticWorld;
