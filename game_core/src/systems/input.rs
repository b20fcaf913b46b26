use hecs::World;

use crate::components::*;
use crate::resources::*;

/// Ingest queued directions and turn them into paddle intents
///
/// Paddles marked [`AiControlled`] ignore human input. While the inverted
/// controls power-up is active every direction is flipped.
pub fn ingest_inputs(world: &mut World, queue: &mut InputQueue, powerups: &PowerUpState) {
    let flip = if powerups.controls_inverted { -1 } else { 1 };

    for (side, dir) in queue.pop_inputs() {
        for (_entity, (paddle, intent, ai)) in
            world.query_mut::<(&Paddle, &mut PaddleIntent, Option<&AiControlled>)>()
        {
            if paddle.side == side && ai.is_none() {
                intent.dir = dir * flip;
            }
        }
    }
}
