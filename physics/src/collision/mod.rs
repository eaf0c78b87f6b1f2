/*!
Capsule-vs-static collision for the character controller.

Split into:
- `types`: shared math aliases and collision data types
- `settings`: tolerance constants
- `broad`: world AABBs and swept candidate pruning
- `resolver`: discrete position resolution and ground sensing
*/

pub mod broad;
pub mod resolver;
pub mod settings;
pub mod types;

pub use resolver::CollisionResolver;
pub use types::{PlayerCapsule, Resolution, StaticCollider, Support, Vec3};
