//! Steering behaviours.
//!
//! Pure functions that turn kinematic state into a 2D force. Forces pushed
//! during a tick are collected in a [`SteeringAccumulator`] and summed into
//! a single acceleration by the movement step.

use serde::{Deserialize, Serialize};

use crate::components::Body;
use crate::math::Vec2;

/// Default slowing radius for [`arrival_steer`].
pub const DEFAULT_SLOWING_RADIUS: f32 = 50.0;

/// Wander circle parameters plus the random-walk angle.
///
/// The angle is the only steering state that survives between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WanderState {
    /// Radius of the wander circle.
    pub radial_mag: f32,
    /// Distance of the circle center ahead of the body.
    pub distance_extension: f32,
    /// Current angle on the circle (radians).
    pub angle: f32,
    /// Maximum angle change per wander step.
    pub variance: f32,
}

impl WanderState {
    /// Create a wander state starting at angle 0.
    #[must_use]
    pub const fn new(radial_mag: f32, distance_extension: f32, variance: f32) -> Self {
        Self {
            radial_mag,
            distance_extension,
            angle: 0.0,
            variance,
        }
    }
}

/// Vector from `source` toward `target`.
#[must_use]
pub fn seek(source: Vec2, target: Vec2) -> Vec2 {
    target - source
}

/// Vector from `target` toward `source`.
#[must_use]
pub fn flee(source: Vec2, target: Vec2) -> Vec2 {
    -seek(source, target)
}

/// Steering force toward a fixed point at full speed.
#[must_use]
pub fn seek_steer(source: &Body, target: Vec2) -> Vec2 {
    let desired = seek(source.position, target).with_length(source.max_speed);
    desired - source.velocity
}

/// Steering force away from a fixed point at full speed.
#[must_use]
pub fn flee_steer(source: &Body, target: Vec2) -> Vec2 {
    let desired = flee(source.position, target).with_length(source.max_speed);
    desired - source.velocity
}

/// Steering force toward `target`, ramping speed down inside `slowing_radius`.
#[must_use]
pub fn arrival_steer(source: &Body, target: Vec2, slowing_radius: f32) -> Vec2 {
    let offset = seek(source.position, target);
    let distance = offset.length();
    let speed = if distance < slowing_radius && slowing_radius > 0.0 {
        source.max_speed * (distance / slowing_radius)
    } else {
        source.max_speed
    };
    offset.with_length(speed) - source.velocity
}

/// Where `target` will be by the time `source` covers the gap between them.
fn future_position(source: &Body, target: &Body) -> Vec2 {
    let distance = source.position.distance(target.position);
    let lookahead = if target.max_speed > 0.0 {
        distance / target.max_speed
    } else {
        0.0
    };
    target.position + target.velocity.scale(lookahead)
}

/// Steering force intercepting a moving target.
#[must_use]
pub fn pursuit(source: &Body, target: &Body) -> Vec2 {
    let future = future_position(source, target);
    let desired = seek(source.position, future).with_length(source.max_speed);
    desired - source.velocity
}

/// Steering force escaping a moving target.
#[must_use]
pub fn evade(source: &Body, target: &Body) -> Vec2 {
    let future = future_position(source, target);
    let desired = flee(source.position, future).with_length(source.max_speed);
    desired - source.velocity
}

/// Wander target: a point on a circle projected ahead of the body.
///
/// The caller advances `state.angle` after using the result.
#[must_use]
pub fn wander(source: &Body, state: &WanderState) -> Vec2 {
    let circle_center = source.velocity.normalize().scale(state.distance_extension);
    let displacement = Vec2::from_angle(state.angle).scale(state.radial_mag);
    circle_center + displacement
}

/// Cap the magnitude of `vector` at `max`.
///
/// Vectors already within the cap come back untouched.
#[must_use]
pub fn limit(vector: Vec2, max: f32) -> Vec2 {
    if vector.length() > max {
        return vector.with_length(max);
    }
    vector
}

/// Rotation (radians) for a sprite facing along `direction`.
///
/// Zero points up the screen, increasing clockwise.
#[must_use]
pub fn facing(direction: Vec2) -> f32 {
    direction.x.atan2(-direction.y)
}

/// Label attached to each force pushed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringBehaviour {
    /// Moving toward a target.
    Seek,
    /// Moving away from a target.
    Flee,
    /// Idle roaming.
    Wander,
    /// Circling a target at weapon range.
    Orbit,
}

/// Forces pushed during one tick, in push order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteeringAccumulator {
    forces: Vec<(SteeringBehaviour, Vec2)>,
}

impl SteeringAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a force.
    pub fn push(&mut self, behaviour: SteeringBehaviour, force: Vec2) {
        self.forces.push((behaviour, force));
    }

    /// Vector sum of every force pushed so far.
    #[must_use]
    pub fn net_force(&self) -> Vec2 {
        self.forces.iter().map(|(_, force)| *force).sum()
    }

    /// Behaviour labels in push order.
    #[must_use]
    pub fn behaviours(&self) -> Vec<SteeringBehaviour> {
        self.forces.iter().map(|(behaviour, _)| *behaviour).collect()
    }

    /// Labelled forces in push order.
    #[must_use]
    pub fn forces(&self) -> &[(SteeringBehaviour, Vec2)] {
        &self.forces
    }

    /// Number of forces pushed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    /// Check if nothing was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Drop all forces.
    pub fn clear(&mut self) {
        self.forces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;
    use std::f32::consts::PI;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), 100.0)
    }

    #[test]
    fn test_seek_and_flee_are_opposite() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!(seek(a, b), Vec2::new(3.0, 4.0));
        assert_eq!(flee(a, b), Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_pursuit_stationary_target() {
        let source = body_at(0.0, 0.0);
        let target = body_at(10.0, 0.0);
        let force = pursuit(&source, &target);
        assert!(force.approx_eq(Vec2::new(100.0, 0.0), EPSILON));
    }

    #[test]
    fn test_pursuit_leads_moving_target() {
        let source = body_at(0.0, 0.0);
        // distance 100, target max speed 100 -> one second lookahead
        let target = body_at(100.0, 0.0).with_velocity(Vec2::new(0.0, 100.0));
        let force = pursuit(&source, &target);
        let expected = Vec2::new(100.0, 100.0).with_length(100.0);
        assert!(force.approx_eq(expected, EPSILON));
    }

    #[test]
    fn test_evade_subtracts_current_velocity() {
        let source = body_at(0.0, 0.0).with_velocity(Vec2::new(-20.0, 0.0));
        let target = body_at(10.0, 0.0);
        let force = evade(&source, &target);
        assert!(force.approx_eq(Vec2::new(-80.0, 0.0), EPSILON));
    }

    #[test]
    fn test_pursuit_of_immobile_target_does_not_nan() {
        let source = body_at(0.0, 0.0);
        let mut target = body_at(50.0, 0.0);
        target.max_speed = 0.0;
        assert!(pursuit(&source, &target).is_finite());
    }

    #[test]
    fn test_arrival_slows_inside_radius() {
        let source = body_at(0.0, 0.0);
        let far = arrival_steer(&source, Vec2::new(200.0, 0.0), DEFAULT_SLOWING_RADIUS);
        let near = arrival_steer(&source, Vec2::new(25.0, 0.0), DEFAULT_SLOWING_RADIUS);
        assert!(far.approx_eq(Vec2::new(100.0, 0.0), EPSILON));
        assert!(near.approx_eq(Vec2::new(50.0, 0.0), EPSILON));
    }

    #[test]
    fn test_seek_steer_full_speed() {
        let source = body_at(0.0, 0.0);
        let force = seek_steer(&source, Vec2::new(0.0, 300.0));
        assert!(force.approx_eq(Vec2::new(0.0, 100.0), EPSILON));
        let away = flee_steer(&source, Vec2::new(0.0, 300.0));
        assert!(away.approx_eq(Vec2::new(0.0, -100.0), EPSILON));
    }

    #[test]
    fn test_wander_from_rest() {
        // At rest the circle center collapses to zero, leaving the displacement
        let state = WanderState {
            angle: PI / 2.0,
            ..WanderState::new(200.0, 100.0, 0.1)
        };
        let force = wander(&body_at(0.0, 0.0), &state);
        assert!(force.approx_eq(Vec2::new(0.0, 200.0), 1e-3));
    }

    #[test]
    fn test_wander_projects_ahead() {
        let state = WanderState::new(10.0, 100.0, 0.1);
        let moving = body_at(0.0, 0.0).with_velocity(Vec2::new(0.0, -5.0));
        let force = wander(&moving, &state);
        assert!(force.approx_eq(Vec2::new(10.0, -100.0), EPSILON));
    }

    #[test]
    fn test_limit() {
        let long = Vec2::new(30.0, 40.0);
        let capped = limit(long, 10.0);
        assert!((capped.length() - 10.0).abs() < EPSILON);
        assert!(capped.approx_eq(Vec2::new(6.0, 8.0), EPSILON));

        let short = Vec2::new(3.0, 4.0);
        assert_eq!(limit(short, 10.0), short);
    }

    #[test]
    fn test_facing() {
        assert!((facing(Vec2::new(0.0, -1.0)) - 0.0).abs() < EPSILON);
        assert!((facing(Vec2::new(1.0, 0.0)) - PI / 2.0).abs() < EPSILON);
        assert!((facing(Vec2::new(0.0, 1.0)).abs() - PI).abs() < EPSILON);
    }

    #[test]
    fn test_accumulator_sums_and_labels() {
        let mut acc = SteeringAccumulator::new();
        assert_eq!(acc.net_force(), Vec2::ZERO);

        acc.push(SteeringBehaviour::Wander, Vec2::new(1.0, 2.0));
        acc.push(SteeringBehaviour::Flee, Vec2::new(-4.0, 1.0));
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.net_force(), Vec2::new(-3.0, 3.0));
        assert_eq!(
            acc.behaviours(),
            vec![SteeringBehaviour::Wander, SteeringBehaviour::Flee]
        );

        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.net_force(), Vec2::ZERO);
    }
}
