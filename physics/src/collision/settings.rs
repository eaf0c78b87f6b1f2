/*!
Tolerance constants for the capsule resolver and ground sensing.

These are world-space distances in meters. They trade positional accuracy
against stability of the grounded/airborne decision; each constant documents
what breaks when it is mis-tuned.
*/

/// Horizontal radius of the player capsule.
pub const PLAYER_RADIUS: f32 = 0.5;

/// Distance from the player's feet to the eye. The controller's position is
/// the eye, so the feet sit at `position.y - PLAYER_HEIGHT`.
pub const PLAYER_HEIGHT: f32 = 1.7;

/// How far below a plane surface the eye may sink before the resolver clamps
/// it back up. Too small and floating-point drift triggers a clamp (and a
/// vertical velocity zero) every tick while standing still; too large and the
/// player visibly sinks into the floor.
pub const GROUND_EPS: f32 = 0.05;

/// Half-width of the landing band around a collider's top surface. Feet
/// within `top ± LANDING_BAND` count as a landing even without strict
/// vertical overlap, so a falling capsule cannot step past a thin top surface
/// in one tick at moderate speeds.
pub const LANDING_BAND: f32 = 0.1;

/// Height band for the standing test in ground sensing. Wider than the
/// landing band so a player already standing on a platform keeps its support
/// through small vertical jitter.
pub const STANDING_BAND: f32 = 0.2;

/// Hysteresis band for keeping the previous platform support. When a tick
/// finds no support but the feet are still within this distance of the
/// previous platform top, the player is re-snapped instead of dropped. Stops
/// grounded/airborne flicker while walking across a platform edge.
pub const PLATFORM_HYSTERESIS_BAND: f32 = 0.2;

/// Minimum feet clearance above the ground plane for the resolver to report
/// a position as airborne.
pub const AIRBORNE_CLEARANCE: f32 = 0.1;

/// Horizontal distance of the depenetration micro-push applied when the
/// previous position already penetrates a collider. Applied once per tick
/// per collider, so deep penetrations resolve over several ticks instead of
/// teleporting the player.
pub const DEPENETRATION_PUSH: f32 = 0.1;
