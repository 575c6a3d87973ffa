//! Bicycle-model vehicle kinematics.
//!
//! Pure functions over plain data, testable without a renderer. The model
//! owns the [`VehicleState`]; everything else reads a snapshot.

use glam::Vec3;

use crate::{
    config::VehicleParams,
    error::{Error, Result},
    time::FrameDelta,
};

/// Steering angle substituted when the wheels are exactly straight.
///
/// Keeps the turning radius finite: straight driving becomes a very wide
/// turn instead of a division by `sin(0)`.
pub const MIN_STEERING_ANGLE: f32 = 1e-4;

/// Below this magnitude a relaxing steering angle snaps to straight.
pub const STEERING_REST_EPSILON: f32 = 1e-3;

/// Discrete steering intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SteerIntent {
    /// Turn toward negative steering angles.
    Left,
    /// No steering input.
    #[default]
    Straight,
    /// Turn toward positive steering angles.
    Right,
}

impl SteerIntent {
    /// Resolve from key levels; right wins when both are held.
    #[must_use]
    pub fn from_keys(left: bool, right: bool) -> Self {
        if right {
            Self::Right
        } else if left {
            Self::Left
        } else {
            Self::Straight
        }
    }

    /// Sign of the intent: -1, 0 or +1.
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Straight => 0.0,
            Self::Right => 1.0,
        }
    }
}

impl TryFrom<i8> for SteerIntent {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(Self::Left),
            0 => Ok(Self::Straight),
            1 => Ok(Self::Right),
            other => Err(Error::invalid_input(
                "steer intent",
                format!("expected -1, 0 or 1, got {other}"),
            )),
        }
    }
}

/// Discrete throttle intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThrottleIntent {
    /// Speed up forward.
    Accelerate,
    /// Slow down, then reverse.
    Brake,
    /// Coast.
    #[default]
    None,
}

impl ThrottleIntent {
    /// Resolve from key levels; brake wins when both are held.
    #[must_use]
    pub fn from_keys(accelerate: bool, brake: bool) -> Self {
        if brake {
            Self::Brake
        } else if accelerate {
            Self::Accelerate
        } else {
            Self::None
        }
    }
}

/// Control input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInput {
    /// Steering intent.
    pub steer: SteerIntent,
    /// Throttle intent.
    pub throttle: ThrottleIntent,
}

/// Kinematic state of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// Ground position.
    pub position: Vec3,
    /// Facing angle around +Y (radians, not wrapped).
    pub heading: f32,
    /// Wheel steering angle (radians).
    pub steering: f32,
    /// Signed speed along the heading.
    pub velocity: f32,
}

impl VehicleState {
    /// A vehicle at rest at `position`, facing `heading`.
    #[must_use]
    pub fn at(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading,
            ..Default::default()
        }
    }

    /// Unit forward direction in the ground plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        forward_from_heading(self.heading)
    }
}

/// Unit forward direction for a heading: +Z at zero, turning toward +X.
#[must_use]
pub fn forward_from_heading(heading: f32) -> Vec3 {
    let (sin, cos) = heading.sin_cos();
    Vec3::new(sin, 0.0, cos)
}

/// Integrates [`VehicleState`] from control input.
#[derive(Clone, Debug)]
pub struct VehicleModel {
    params: VehicleParams,
    state: VehicleState,
}

impl VehicleModel {
    /// Create a model after validating `params`.
    pub fn new(params: VehicleParams, initial: VehicleState) -> Result<Self> {
        params.validate()?;
        let mut state = initial;
        state.steering = state
            .steering
            .clamp(-params.max_steering, params.max_steering);
        state.velocity = state
            .velocity
            .clamp(params.min_velocity, params.max_velocity);
        Ok(Self { params, state })
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Constants in use.
    #[must_use]
    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// Advance by one frame.
    pub fn advance(&mut self, delta: FrameDelta, input: ControlInput) -> &VehicleState {
        if delta.is_zero() {
            return &self.state;
        }
        let dt = delta.secs();
        self.state.steering = step_steering(&self.params, self.state.steering, input.steer, dt);
        self.state.velocity = step_velocity(&self.params, self.state.velocity, input.throttle, dt);
        integrate_pose(&self.params, &mut self.state, dt);
        &self.state
    }
}

/// Move the steering angle toward the intent, or relax it toward straight.
fn step_steering(params: &VehicleParams, steering: f32, intent: SteerIntent, dt: f32) -> f32 {
    match intent {
        SteerIntent::Straight => {
            let relaxed = steering * (-params.steering_return * dt).exp();
            if relaxed.abs() < STEERING_REST_EPSILON {
                0.0
            } else {
                relaxed
            }
        }
        _ => (steering + intent.sign() * params.steering_speed * dt)
            .clamp(-params.max_steering, params.max_steering),
    }
}

/// Apply throttle, then friction, keeping velocity within bounds.
fn step_velocity(params: &VehicleParams, velocity: f32, throttle: ThrottleIntent, dt: f32) -> f32 {
    let driven = match throttle {
        ThrottleIntent::Accelerate => velocity + params.acceleration * dt,
        ThrottleIntent::Brake => velocity - params.brake_deceleration * dt,
        ThrottleIntent::None => velocity,
    }
    .clamp(params.min_velocity, params.max_velocity);

    // Friction opposes coasting and braking against forward motion, but not
    // deliberate acceleration or reversing.
    let resists = match throttle {
        ThrottleIntent::None => true,
        ThrottleIntent::Brake => velocity > 0.0,
        ThrottleIntent::Accelerate => false,
    };
    if resists {
        move_toward(driven, 0.0, params.friction * dt)
    } else {
        driven
    }
}

/// Advance heading and position along the bicycle-model arc.
fn integrate_pose(params: &VehicleParams, state: &mut VehicleState, dt: f32) {
    let steering = if state.steering == 0.0 {
        MIN_STEERING_ANGLE
    } else {
        state.steering
    };
    let turn_radius = params.wheel_base / steering.sin();
    let angular_velocity = state.velocity / turn_radius;

    state.heading += angular_velocity * dt;
    state.position += forward_from_heading(state.heading) * state.velocity * dt;
}

/// Move a value toward a target by at most `max_delta`, landing exactly on it.
#[must_use]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn delta(secs: f32) -> FrameDelta {
        FrameDelta::new(secs, 1.0).unwrap()
    }

    fn model() -> VehicleModel {
        VehicleModel::new(VehicleParams::default(), VehicleState::default()).unwrap()
    }

    fn input(steer: SteerIntent, throttle: ThrottleIntent) -> ControlInput {
        ControlInput { steer, throttle }
    }

    #[test]
    fn test_accelerate_one_second() {
        let mut model = model();
        model.advance(delta(1.0), input(SteerIntent::Straight, ThrottleIntent::Accelerate));
        assert_eq!(model.state().velocity, 10.0);
    }

    #[test]
    fn test_acceleration_clamps_to_max_velocity() {
        let mut model = model();
        for _ in 0..5 {
            model.advance(delta(1.0), input(SteerIntent::Straight, ThrottleIntent::Accelerate));
        }
        assert_eq!(model.state().velocity, 20.0);
    }

    #[test]
    fn test_reverse_clamps_to_min_velocity() {
        let mut model = model();
        for _ in 0..10 {
            model.advance(delta(1.0), input(SteerIntent::Straight, ThrottleIntent::Brake));
        }
        assert_eq!(model.state().velocity, -10.0);
    }

    #[test]
    fn test_steering_saturates_without_overshoot() {
        let mut model = model();
        let max = model.params().max_steering;
        for _ in 0..10 {
            model.advance(delta(0.1), input(SteerIntent::Right, ThrottleIntent::None));
            assert!(model.state().steering <= max);
        }
        assert_eq!(model.state().steering, max);

        for _ in 0..20 {
            model.advance(delta(0.1), input(SteerIntent::Left, ThrottleIntent::None));
        }
        assert_eq!(model.state().steering, -max);
    }

    #[test]
    fn test_steering_relaxes_to_exactly_zero() {
        let mut model = model();
        model.advance(delta(0.3), input(SteerIntent::Right, ThrottleIntent::None));
        let turned = model.state().steering;
        assert!(turned > 0.0);

        model.advance(delta(0.1), ControlInput::default());
        let relaxing = model.state().steering;
        assert!(relaxing > 0.0 && relaxing < turned);

        for _ in 0..60 {
            model.advance(delta(0.05), ControlInput::default());
        }
        assert_eq!(model.state().steering, 0.0);
    }

    #[test]
    fn test_friction_snaps_to_rest() {
        let mut model = VehicleModel::new(
            VehicleParams::default(),
            VehicleState {
                velocity: 0.2,
                ..Default::default()
            },
        )
        .unwrap();
        // One friction step (5 * 0.05 = 0.25) exceeds the remaining speed.
        model.advance(delta(0.05), ControlInput::default());
        assert_eq!(model.state().velocity, 0.0);
        model.advance(delta(0.05), ControlInput::default());
        assert_eq!(model.state().velocity, 0.0);
    }

    #[test]
    fn test_brake_against_motion_adds_friction() {
        let start = VehicleState {
            velocity: 10.0,
            ..Default::default()
        };
        let mut model = VehicleModel::new(VehicleParams::default(), start).unwrap();
        model.advance(delta(0.1), input(SteerIntent::Straight, ThrottleIntent::Brake));
        // Brake 10 * 0.1 plus friction 5 * 0.1.
        assert!((model.state().velocity - 8.5).abs() < 1e-5);
    }

    #[test]
    fn test_reversing_ignores_friction() {
        let mut model = model();
        model.advance(delta(0.1), input(SteerIntent::Straight, ThrottleIntent::Brake));
        assert!((model.state().velocity + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_straight_driving_is_finite() {
        let mut model = VehicleModel::new(
            VehicleParams::default(),
            VehicleState {
                velocity: 10.0,
                ..Default::default()
            },
        )
        .unwrap();
        model.advance(delta(0.05), input(SteerIntent::Straight, ThrottleIntent::Accelerate));
        let state = model.state();
        assert!(state.heading.is_finite());
        assert!(state.heading.abs() < 1e-4);
        assert!(state.position.z > 0.5);
        assert!(state.position.x.abs() < 1e-4);
    }

    #[test]
    fn test_positive_steering_turns_toward_positive_x() {
        let mut model = VehicleModel::new(
            VehicleParams::default(),
            VehicleState {
                velocity: 5.0,
                steering: 0.5,
                ..Default::default()
            },
        )
        .unwrap();
        for _ in 0..10 {
            model.advance(delta(0.05), input(SteerIntent::Right, ThrottleIntent::Accelerate));
        }
        assert!(model.state().heading > 0.0);
        assert!(model.state().position.x > 0.0);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let start = VehicleState {
            position: Vec3::new(1.0, 0.0, 2.0),
            heading: 0.3,
            steering: 0.2,
            velocity: 4.0,
        };
        let mut model = VehicleModel::new(VehicleParams::default(), start).unwrap();
        model.advance(
            FrameDelta::ZERO,
            input(SteerIntent::Left, ThrottleIntent::Accelerate),
        );
        assert_eq!(*model.state(), start);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = VehicleParams {
            max_velocity: -1.0,
            ..Default::default()
        };
        assert!(VehicleModel::new(params, VehicleState::default()).is_err());
    }

    #[test]
    fn test_steer_intent_from_raw() {
        assert_eq!(SteerIntent::try_from(-1).unwrap(), SteerIntent::Left);
        assert_eq!(SteerIntent::try_from(1).unwrap(), SteerIntent::Right);
        assert!(SteerIntent::try_from(2).is_err());
        assert_eq!(SteerIntent::from_keys(true, true), SteerIntent::Right);
        assert_eq!(ThrottleIntent::from_keys(true, true), ThrottleIntent::Brake);
    }

    fn arb_input() -> impl Strategy<Value = ControlInput> {
        (0..3u8, 0..3u8).prop_map(|(s, t)| ControlInput {
            steer: [SteerIntent::Left, SteerIntent::Straight, SteerIntent::Right][s as usize],
            throttle: [
                ThrottleIntent::Accelerate,
                ThrottleIntent::Brake,
                ThrottleIntent::None,
            ][t as usize],
        })
    }

    proptest! {
        #[test]
        fn prop_state_stays_within_bounds(
            steps in prop::collection::vec((arb_input(), 0.0f32..0.2), 1..200)
        ) {
            let mut model = model();
            let params = model.params().clone();
            for (control, secs) in steps {
                let state = *model.advance(FrameDelta::new(secs, 0.05).unwrap(), control);
                prop_assert!(state.steering.abs() <= params.max_steering);
                prop_assert!(state.velocity >= params.min_velocity);
                prop_assert!(state.velocity <= params.max_velocity);
                prop_assert!(state.position.is_finite());
                prop_assert!(state.heading.is_finite());
            }
        }
    }
}
