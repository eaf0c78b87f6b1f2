/*!
Simulation facade: one fixed tick over the whole scene.

A tick runs the character step first (input smoothing, jump state, push,
static resolution) and the rigid-body pass second (support, pairwise
contact, integration). Hosts own the clock and the input; the facade only
orders the passes.
*/

use crate::body::DynamicBody;
use crate::character::{CharacterController, PlayerState};
use crate::collision::types::Vec3;
use crate::contact;
use crate::world::StaticWorld;

/// A complete scene: static geometry, the player and the dynamic bodies.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub world: StaticWorld,
    pub controller: CharacterController,
    pub bodies: Vec<DynamicBody>,
}

impl Simulation {
    pub fn new(world: StaticWorld, controller: CharacterController, bodies: Vec<DynamicBody>) -> Self {
        Self {
            world,
            controller,
            bodies,
        }
    }

    /// Advances the scene by one tick. The tick duration is clamped once
    /// here so a stalled host cannot feed a huge step to either pass.
    pub fn tick(&mut self, intent: Vec3, jump_requested: bool, dt: f32) {
        let dt = dt.clamp(0.0, self.controller.config.max_dt);
        self.controller
            .step(&self.world, &mut self.bodies, intent, jump_requested, dt);
        contact::step_bodies(
            &mut self.bodies,
            &self.world,
            self.controller.config.gravity,
            dt,
        );
    }

    #[inline]
    pub fn player(&self) -> &PlayerState {
        &self.controller.state
    }
}
