//! Movement systems.
//!
//! [`apply_steering`] is the AI side: it folds the tick's forces into one
//! acceleration and sets facing. [`integrate_body`] is the host side used by
//! the arena simulation: acceleration into velocity, velocity into position.

use crate::agent::Agent;
use crate::components::Body;
use crate::math::Vec2;
use crate::steering::{facing, limit, SteeringAccumulator};

/// Write the tick's steering result to the agent's body.
///
/// Immobilized agents have both acceleration and velocity zeroed and keep
/// their rotation. Otherwise acceleration becomes the net force and the
/// agent faces `facing_override` if an attack set one, else its velocity.
///
/// Returns the acceleration written.
pub fn apply_steering(agent: &mut Agent, steering: &SteeringAccumulator, facing_override: Option<f32>) -> Vec2 {
    if agent.status.is_immobilized() {
        agent.body.halt();
        return Vec2::ZERO;
    }

    let net = steering.net_force();
    agent.body.acceleration = net;
    agent.rotation = facing_override.unwrap_or_else(|| facing(agent.body.velocity));
    net
}

/// Advance a body by `dt_secs`, keeping it inside `[0, bounds]`.
///
/// Velocity is capped at the body's max speed. Hitting a wall zeroes the
/// velocity component pointing into it.
pub fn integrate_body(body: &mut Body, dt_secs: f32, bounds: Vec2) {
    body.velocity = limit(body.velocity + body.acceleration.scale(dt_secs), body.max_speed);
    body.position += body.velocity.scale(dt_secs);

    let max_x = (bounds.x - body.size.x).max(0.0);
    let max_y = (bounds.y - body.size.y).max(0.0);

    if body.position.x < 0.0 || body.position.x > max_x {
        body.position.x = body.position.x.clamp(0.0, max_x);
        body.velocity.x = 0.0;
    }
    if body.position.y < 0.0 || body.position.y > max_y {
        body.position.y = body.position.y.clamp(0.0, max_y);
        body.velocity.y = 0.0;
    }
}
