/*!
First-person character controller.

The controller is a kinematic capsule driven by an explicit, ordered rule
list evaluated once per tick. Rules are deliberately sequential and later
rules override earlier ones within the same tick; the grounded/airborne
decision in particular is made several times and the last write wins. The
ordering is part of the observable behavior and must not be shuffled.

The eye is the authoritative position: `position.y` is the eye, feet are at
`position.y - eye_height`. A jump is tracked with `time_since_jump`, which
accumulates clamped tick time, so every timer here is deterministic under a
fixed tick.
*/

use log::{debug, trace};

use crate::body::DynamicBody;
use crate::collision::resolver::CollisionResolver;
use crate::collision::settings::GROUND_EPS;
use crate::collision::types::{Support, Vec3};
use crate::world::StaticWorld;

/// Tunable controller parameters. Linear quantities are meters and seconds.
#[derive(Clone, Copy, Debug)]
pub struct CharacterConfig {
    /// Feet-to-eye distance of the capsule.
    pub eye_height: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Upward velocity set when a jump starts.
    pub jump_force: f32,
    /// Maximum downward speed.
    pub terminal_velocity: f32,
    /// Exponential smoothing factor for horizontal velocity: each tick
    /// `v = v * smoothing + intent * (1 - smoothing)`.
    pub movement_smoothing: f32,
    /// Delay before another jump can start.
    pub jump_cooldown: f32,
    /// A jump cannot land before this much airtime has passed. Filters the
    /// spurious ground contacts of the first airborne ticks.
    pub min_airtime: f32,
    /// A jump older than this is force-landed by the watchdog.
    pub max_airtime: f32,
    /// Startup window during which the player is forced grounded, so a scene
    /// that spawns the capsule slightly off the floor cannot drop it.
    pub warmup_window: f32,
    /// Upper clamp on the per-tick time step.
    pub max_dt: f32,
    /// Band around `eye_height` treated as standing at floor level.
    pub eye_snap_band: f32,
    /// Height above `eye_height` beyond which the player cannot be grounded
    /// unless standing on a platform.
    pub high_altitude_margin: f32,
    /// Mass used to scale pushes against heavier bodies.
    pub player_mass: f32,
    /// Base magnitude of the push force applied to nearby movable bodies.
    pub push_strength: f32,
    /// Horizontal range of the interactive push.
    pub interaction_radius: f32,
    /// Minimum alignment (dot of movement direction with the player-to-body
    /// direction) for a push to apply.
    pub push_alignment_min: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.7,
            gravity: 9.8,
            jump_force: 5.0,
            terminal_velocity: 20.0,
            movement_smoothing: 0.8,
            jump_cooldown: 0.3,
            min_airtime: 0.5,
            max_airtime: 2.0,
            warmup_window: 1.0,
            max_dt: 0.1,
            eye_snap_band: 0.1,
            high_altitude_margin: 0.5,
            player_mass: 70.0,
            push_strength: 500.0,
            interaction_radius: 2.0,
            push_alignment_min: 0.3,
        }
    }
}

/// Kinematic state of the player, public for hosts that replicate it.
#[derive(Clone, Copy, Debug)]
pub struct PlayerState {
    /// Eye position.
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub jumping: bool,
    pub standing_on_platform: bool,
    /// Top height of the current platform, 0.0 at floor level.
    pub platform_height: f32,
    /// Platform height before the most recent platform change.
    pub last_platform_height: f32,
    /// Remaining time before another jump may start.
    pub jump_cooldown: f32,
    /// Accumulated simulation time since the current jump started.
    /// Saturated large while no jump is in flight.
    pub time_since_jump: f32,
    /// True only on the tick a landing happened.
    pub just_landed: bool,
    /// Eye position at the most recent landing, while `just_landed` holds.
    pub landing_position: Option<Vec3>,
}

impl PlayerState {
    fn at(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::zeros(),
            on_ground: true,
            jumping: false,
            standing_on_platform: false,
            platform_height: 0.0,
            last_platform_height: 0.0,
            jump_cooldown: 0.0,
            time_since_jump: f32::MAX,
            just_landed: false,
            landing_position: None,
        }
    }
}

/// The controller itself: config, state, resolver and the cross-tick
/// support hint that feeds platform hysteresis.
#[derive(Clone, Copy, Debug)]
pub struct CharacterController {
    pub config: CharacterConfig,
    pub state: PlayerState,
    resolver: CollisionResolver,
    support: Option<Support>,
    elapsed: f32,
}

impl CharacterController {
    pub fn new(config: CharacterConfig, spawn: Vec3) -> Self {
        Self {
            config,
            state: PlayerState::at(spawn),
            resolver: CollisionResolver::default(),
            support: None,
            elapsed: 0.0,
        }
    }

    /// Advances the player by one tick.
    ///
    /// `intent` is the desired horizontal velocity in world space (its Y
    /// component is ignored). The per-tick algorithm, in order:
    ///
    ///  1. clamp dt, advance timers, reset the landing edge flags
    ///  2. airtime watchdog: a jump in flight too long is force-landed
    ///  3. eye-level snap: a jump back near floor level lands
    ///  4. ground sensing (a jump in flight stays airborne; otherwise the
    ///     warm-up forcing wins over the sensed state)
    ///  5. landing-edge filter: reject ground contact too early in a jump
    ///  6. jump initiation
    ///  7. cooldown decay
    ///  8. horizontal smoothing toward the intent
    ///  9. vertical integration (gravity + terminal clamp, or settle)
    /// 10. desired position from velocity
    /// 11. interactive push against nearby movable bodies
    /// 12. static collision resolution
    /// 13. per-axis velocity zeroing and landing finalization
    /// 14. post-jump minimum-airtime enforcement
    /// 15. high-altitude correction and the floor-level forced landing
    pub fn step(
        &mut self,
        world: &StaticWorld,
        bodies: &mut [DynamicBody],
        intent: Vec3,
        jump_requested: bool,
        dt: f32,
    ) {
        let cfg = self.config;
        let mut s = self.state;
        let mut hint = self.support;

        // 1. Timekeeping and edge-flag reset.
        let dt = dt.clamp(0.0, cfg.max_dt);
        self.elapsed += dt;
        s.just_landed = false;
        s.landing_position = None;
        if s.time_since_jump < f32::MAX {
            s.time_since_jump += dt;
        }
        let was_on_ground = s.on_ground;
        let was_jumping = s.jumping;

        // 2. Airtime watchdog.
        if s.jumping && s.time_since_jump > cfg.max_airtime {
            debug!(
                "airtime watchdog: forcing landing after {:.2}s",
                s.time_since_jump
            );
            s.jumping = false;
            s.on_ground = true;
            s.velocity.y = 0.0;
            s.jump_cooldown = 0.0;
        }

        // 3. Eye-level snap: a jump that has returned near floor level lands
        // where it is.
        if s.jumping
            && (s.position.y - cfg.eye_height).abs() < cfg.eye_snap_band
            && s.time_since_jump > cfg.min_airtime
        {
            s.jumping = false;
            s.on_ground = true;
            s.velocity.y = 0.0;
            s.jump_cooldown = 0.0;
            s.just_landed = true;
            s.landing_position = Some(s.position);
        }

        // 4. Ground sensing. A jump in flight is airborne even inside the
        // warm-up window; the forcing only protects a non-jumping player.
        if s.jumping {
            s.on_ground = false;
        } else if self.elapsed < cfg.warmup_window {
            s.on_ground = true;
        } else if (s.position.y - cfg.eye_height).abs() < cfg.eye_snap_band {
            s.on_ground = true;
            s.standing_on_platform = false;
            s.platform_height = 0.0;
        } else {
            let sensed = self.resolver.ground_support(world, s.position);
            s.on_ground = sensed.is_some();
            match sensed.filter(|sup| sup.is_platform) {
                Some(platform) => {
                    s.standing_on_platform = true;
                    if (s.platform_height - platform.height).abs() > 1.0e-6 {
                        s.last_platform_height = s.platform_height;
                    }
                    s.platform_height = platform.height;
                }
                None => s.standing_on_platform = false,
            }
            if sensed.is_some() {
                hint = sensed;
            }
        }

        // 5. Landing-edge filter: ground contact right after takeoff, or
        // while still moving up, is not a landing.
        if !was_on_ground && s.on_ground && was_jumping {
            if s.time_since_jump > cfg.min_airtime && s.velocity.y <= 0.0 {
                s.jumping = false;
                s.jump_cooldown = 0.0;
                s.just_landed = true;
                s.landing_position = Some(s.position);
            } else {
                s.on_ground = false;
            }
        }

        // 6. Jump initiation.
        let mut jump_started = false;
        if jump_requested && s.on_ground && s.jump_cooldown <= 0.0 {
            s.velocity.y = cfg.jump_force;
            s.jumping = true;
            s.on_ground = false;
            s.jump_cooldown = cfg.jump_cooldown;
            s.time_since_jump = 0.0;
            // The takeoff leaves the old support behind; keeping it would
            // let hysteresis snap the player straight back down.
            hint = None;
            jump_started = true;
        }

        // 7. Cooldown decay.
        s.jump_cooldown = (s.jump_cooldown - dt).max(0.0);

        // 8. Horizontal smoothing.
        let keep = cfg.movement_smoothing;
        s.velocity.x = s.velocity.x * keep + intent.x * (1.0 - keep);
        s.velocity.z = s.velocity.z * keep + intent.z * (1.0 - keep);

        // 9. Vertical integration. The takeoff tick keeps the full jump
        // velocity; gravity starts on the next tick.
        if jump_started {
            // velocity.y == jump_force through this tick
        } else if !s.on_ground || s.jumping {
            s.velocity.y -= cfg.gravity * dt;
            if s.velocity.y < -cfg.terminal_velocity {
                s.velocity.y = -cfg.terminal_velocity;
            }
        } else {
            s.velocity.y = 0.0;
        }

        // 10. Desired position.
        let desired = s.position + s.velocity * dt;

        // 11. Interactive push.
        self.push_bodies(bodies, s.position, desired);

        // 12. Static collision.
        let res = self.resolver.resolve(world, s.position, desired, hint);

        // 13. Per-axis velocity zeroing; an upward clamp while falling past
        // the minimum airtime is a landing.
        if res.position != desired {
            if res.position.x != desired.x {
                s.velocity.x = 0.0;
            }
            if res.position.z != desired.z {
                s.velocity.z = 0.0;
            }
            if res.position.y != desired.y {
                let clamped_up = res.position.y > desired.y;
                let falling = s.velocity.y < 0.0;
                s.velocity.y = 0.0;
                if clamped_up && falling && s.time_since_jump > cfg.min_airtime {
                    s.jumping = false;
                    s.on_ground = true;
                    s.jump_cooldown = 0.0;
                    s.just_landed = true;
                    s.landing_position = Some(res.position);
                }
            }
        }
        match res.support {
            Some(sup) => {
                hint = Some(sup);
                if !s.jumping {
                    s.on_ground = true;
                }
                if sup.is_platform {
                    s.standing_on_platform = true;
                    if (s.platform_height - sup.height).abs() > 1.0e-6 {
                        s.last_platform_height = s.platform_height;
                    }
                    s.platform_height = sup.height;
                }
            }
            None => {
                if res.airborne {
                    hint = None;
                }
            }
        }

        // 14. Minimum airtime: a fresh jump is airborne no matter what the
        // rules above concluded.
        if s.jumping && s.time_since_jump < cfg.min_airtime {
            s.on_ground = false;
        }

        // 15. High-altitude correction (pre-move height), then the
        // floor-level forced landing.
        if s.position.y > cfg.eye_height + cfg.high_altitude_margin && !s.standing_on_platform {
            s.on_ground = false;
        }
        if s.jumping
            && (res.position.y - cfg.eye_height).abs() < GROUND_EPS
            && s.time_since_jump > cfg.min_airtime
        {
            debug!("floor-level forced landing at y {:.3}", res.position.y);
            s.jumping = false;
            s.on_ground = true;
            s.velocity.y = 0.0;
            s.jump_cooldown = 0.0;
            s.just_landed = true;
            s.landing_position = Some(res.position);
        }

        s.position = res.position;
        self.state = s;
        self.support = hint;
    }

    /// Pushes movable bodies the player is walking into. The push scales
    /// with how directly the player moves at the body and is capped for
    /// bodies heavier than the player.
    fn push_bodies(&self, bodies: &mut [DynamicBody], prev: Vec3, desired: Vec3) {
        let cfg = &self.config;
        let movement = desired - prev;
        if movement.norm() < 1.0e-3 {
            return;
        }
        let movement = movement.normalize();
        for body in bodies.iter_mut() {
            if !body.movable {
                continue;
            }
            let mut to_body = body.position - desired;
            to_body.y = 0.0;
            let distance = to_body.norm();
            if distance >= cfg.interaction_radius {
                continue;
            }
            let push_dir = if distance > 1.0e-6 {
                to_body / distance
            } else {
                Vec3::x()
            };
            let alignment = movement.dot(&push_dir);
            if alignment > cfg.push_alignment_min {
                let strength = cfg.push_strength
                    * alignment
                    * (cfg.player_mass / body.mass).min(1.0);
                trace!("pushing body with {strength:.1} N");
                body.apply_force(push_dir * strength);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyShape;
    use crate::collision::types::StaticCollider;

    fn flat_world() -> StaticWorld {
        StaticWorld::from_colliders(vec![StaticCollider::Plane { ground_height: 0.0 }])
    }

    fn no_warmup() -> CharacterConfig {
        CharacterConfig {
            warmup_window: 0.0,
            ..CharacterConfig::default()
        }
    }

    fn spawn() -> Vec3 {
        Vec3::new(0.0, 1.7, 0.0)
    }

    #[test]
    fn jump_tick_ends_with_the_full_jump_velocity() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        player.step(&world, &mut [], Vec3::zeros(), true, 0.02);
        assert!(player.state.jumping);
        assert!(!player.state.on_ground);
        assert!((player.state.velocity.y - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn cooldown_blocks_a_second_jump() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        player.state.jump_cooldown = 0.2;
        player.step(&world, &mut [], Vec3::zeros(), true, 0.016);
        assert!(!player.state.jumping);
        assert!(player.state.velocity.y.abs() < 1.0e-6);

        // Once the cooldown has drained the jump goes through.
        player.state.jump_cooldown = 0.0;
        player.step(&world, &mut [], Vec3::zeros(), true, 0.016);
        assert!(player.state.jumping);
        assert!((player.state.velocity.y - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn a_fresh_jump_cannot_land_before_the_minimum_airtime() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        player.step(&world, &mut [], Vec3::zeros(), true, 0.05);
        while player.state.time_since_jump < player.config.min_airtime {
            player.step(&world, &mut [], Vec3::zeros(), false, 0.05);
            assert!(player.state.jumping);
            assert!(!player.state.on_ground);
            assert!(!player.state.just_landed);
        }
    }

    #[test]
    fn falling_speed_clamps_exactly_at_terminal_velocity() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), Vec3::new(0.0, 200.0, 0.0));
        for _ in 0..60 {
            player.step(&world, &mut [], Vec3::zeros(), false, 0.05);
        }
        assert_eq!(player.state.velocity.y, -20.0);
        assert!(!player.state.on_ground);
    }

    #[test]
    fn airtime_watchdog_force_lands_a_stuck_jump() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), Vec3::new(0.0, 30.0, 0.0));
        player.state.jumping = true;
        player.state.time_since_jump = 2.5;
        player.step(&world, &mut [], Vec3::zeros(), false, 0.016);
        assert!(!player.state.jumping);
        assert!(player.state.jump_cooldown.abs() < 1.0e-6);
    }

    #[test]
    fn eye_level_snap_lands_a_returning_jump_in_place() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), Vec3::new(0.0, 1.75, 0.0));
        player.state.jumping = true;
        player.state.time_since_jump = 0.6;
        player.state.velocity.y = -3.0;
        player.step(&world, &mut [], Vec3::zeros(), false, 0.016);
        assert!(!player.state.jumping);
        assert!(player.state.on_ground);
        assert!(player.state.just_landed);
        let landed_at = player.state.landing_position.unwrap();
        assert!((landed_at.y - 1.75).abs() < 1.0e-6);
    }

    #[test]
    fn jump_started_during_warmup_lands_once_at_floor_level() {
        let world = flat_world();
        let mut player = CharacterController::new(CharacterConfig::default(), spawn());
        let dt = 0.02;
        // First tick of the session, well inside the warm-up window.
        player.step(&world, &mut [], Vec3::zeros(), true, dt);
        assert!(player.state.jumping);

        let mut landings = 0;
        let mut landed_at = Vec3::zeros();
        for _ in 0..200 {
            player.step(&world, &mut [], Vec3::zeros(), false, dt);
            // Warm-up forcing must not ground a jump in flight.
            if player.state.jumping {
                assert!(!player.state.on_ground);
            }
            if player.state.just_landed {
                landings += 1;
                landed_at = player.state.landing_position.unwrap();
            }
        }
        assert_eq!(landings, 1);
        assert!((landed_at.y - 1.7).abs() < 0.1);
        assert!(player.state.on_ground);
        assert!(!player.state.jumping);
    }

    #[test]
    fn warmup_window_keeps_the_player_grounded() {
        let world = flat_world();
        // Spawned hovering above the floor; sensing alone would drop it.
        let mut player =
            CharacterController::new(CharacterConfig::default(), Vec3::new(0.0, 2.1, 0.0));
        player.step(&world, &mut [], Vec3::zeros(), false, 0.016);
        assert!(player.state.on_ground);
        assert!(player.state.velocity.y.abs() < 1.0e-6);
    }

    #[test]
    fn walking_onto_a_platform_snaps_to_its_top() {
        let world = StaticWorld::from_colliders(vec![
            StaticCollider::Plane { ground_height: 0.0 },
            StaticCollider::Cuboid {
                center: Vec3::new(5.0, 1.5, 0.0),
                half_extents: Vec3::new(1.5, 1.5, 1.5),
            },
        ]);
        // Feet 0.08 above the platform top, drifting forward.
        let mut player = CharacterController::new(no_warmup(), Vec3::new(5.0, 4.78, 0.0));
        player.step(&world, &mut [], Vec3::new(1.0, 0.0, 0.0), false, 0.016);
        assert!((player.state.position.y - 4.7).abs() < 1.0e-6);
        assert!(player.state.on_ground);
        assert!(player.state.standing_on_platform);
        assert!((player.state.platform_height - 3.0).abs() < 1.0e-6);
    }

    #[test]
    fn push_applies_only_when_moving_at_the_body() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        let mut bodies = [
            DynamicBody::new(
                BodyShape::Sphere { radius: 0.5 },
                Vec3::new(1.5, 0.5, 0.0),
                10.0,
                0.2,
                true,
            ),
            DynamicBody::new(
                BodyShape::Sphere { radius: 0.5 },
                Vec3::new(-1.5, 0.5, 0.0),
                10.0,
                0.2,
                true,
            ),
        ];
        player.step(&world, &mut bodies, Vec3::new(1.0, 0.0, 0.0), false, 0.1);
        // Walking toward the first body pushes it; the body behind is left alone.
        assert!(bodies[0].force.x > 0.0);
        assert!(bodies[0].force.y.abs() < 1.0e-6);
        assert!(bodies[1].force.norm() < 1.0e-6);
    }

    #[test]
    fn push_is_capped_for_heavier_bodies() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        let heavy = DynamicBody::new(
            BodyShape::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            Vec3::new(1.5, 0.5, 0.0),
            700.0,
            0.2,
            true,
        );
        let light = DynamicBody {
            mass: 7.0,
            ..heavy
        };
        let mut bodies = [heavy, light];
        player.step(&world, &mut bodies, Vec3::new(1.0, 0.0, 0.0), false, 0.1);
        // Same geometry, so the mass ratio is the only difference: the
        // heavy body gets a tenth of the capped push.
        assert!(bodies[0].force.x > 0.0);
        assert!((bodies[0].force.x - bodies[1].force.x / 10.0).abs() < 1.0e-3);
    }

    #[test]
    fn immovable_bodies_are_never_pushed() {
        let world = flat_world();
        let mut player = CharacterController::new(no_warmup(), spawn());
        let mut bodies = [DynamicBody::new(
            BodyShape::Sphere { radius: 0.5 },
            Vec3::new(1.5, 0.5, 0.0),
            10.0,
            0.2,
            false,
        )];
        player.step(&world, &mut bodies, Vec3::new(1.0, 0.0, 0.0), false, 0.1);
        assert!(bodies[0].force.norm() < 1.0e-6);
    }
}
