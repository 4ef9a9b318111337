// THEORY:
// The motion gate is the only consumer of the motion mask. Once per tick it looks
// at a single probe pixel (a fixed column, the row the object currently occupies)
// and decides what happens to the object's vertical velocity:
//
// 1. probe pixel flagged        -> velocity := bounce velocity     (Bouncing)
// 2. object past the lower bound -> velocity := 0                   (Resting)
// 3. otherwise                   -> velocity += gravity             (keeps falling)
//
// After the gate has decided, the object moves by its new velocity, in every
// branch: a bounce must move a resting object or the next tick rests it again. Screen
// coordinates grow downward, so a negative bounce velocity lifts the object.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::core_modules::diff_engine::MotionMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Falling,
    Bouncing,
    Resting,
}

/// The position and velocity of the moving object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    pub position: f64,
    pub velocity: f64,
}

/// Physics constants the gate applies every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    pub probe_x: u32,
    pub lower_bound: f64,
    pub gravity: f64,
    pub bounce_velocity: f64,
}

impl From<&PipelineConfig> for GateParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            probe_x: config.probe_column(),
            lower_bound: config.lower_bound(),
            gravity: config.gravity,
            bounce_velocity: config.bounce_velocity,
        }
    }
}

/// Drives the single falling/bouncing object from the motion mask.
#[derive(Debug, Clone)]
pub struct MotionGate {
    params: GateParams,
    physics: PhysicsState,
    state: GateState,
    ticks: u64,
}

impl MotionGate {
    pub fn new(params: GateParams) -> Self {
        Self {
            params,
            physics: PhysicsState { position: 0.0, velocity: 0.0 },
            state: GateState::Falling,
            ticks: 0,
        }
    }

    /// The row sampled this tick: the object's position truncated toward zero.
    /// `None` when the object is above the frame.
    pub fn probe_row(&self) -> Option<u32> {
        let row = self.physics.position.trunc();
        if row < 0.0 || row > u32::MAX as f64 {
            return None;
        }
        Some(row as u32)
    }

    fn probe_hit(&self, mask: &MotionMask) -> bool {
        self.probe_row()
            .is_some_and(|row| mask.contains(self.params.probe_x, row))
    }

    /// Advances the object by one tick against `mask`.
    pub fn step(&mut self, mask: &MotionMask) -> GateState {
        let previous = self.state;

        if self.probe_hit(mask) {
            self.physics.velocity = self.params.bounce_velocity;
            self.state = GateState::Bouncing;
        } else if self.physics.position > self.params.lower_bound {
            self.physics.velocity = 0.0;
            self.state = GateState::Resting;
        } else {
            self.physics.velocity += self.params.gravity;
            if self.state == GateState::Resting {
                self.state = GateState::Falling;
            }
        }
        self.physics.position += self.physics.velocity;
        self.ticks += 1;

        if previous != self.state {
            debug!(
                tick = self.ticks,
                from = ?previous,
                to = ?self.state,
                position = self.physics.position,
                "gate transition"
            );
        }
        self.state
    }

    pub fn physics(&self) -> PhysicsState {
        self.physics
    }

    pub fn state(&self) -> GateState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::diff_engine::diff;
    use crate::core_modules::frame_cache::FrameCache;

    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 40;

    fn params() -> GateParams {
        GateParams {
            probe_x: WIDTH / 2,
            lower_bound: 30.0,
            gravity: 0.01,
            bounce_velocity: -1.0,
        }
    }

    fn mask_with(flagged: &[(u32, u32)]) -> MotionMask {
        let background = FrameCache::zeroed(WIDTH, HEIGHT).unwrap();
        let mut samples = vec![0u8; (WIDTH * HEIGHT) as usize];
        for &(x, y) in flagged {
            samples[(y * WIDTH + x) as usize] = 255;
        }
        let current = FrameCache::from_samples(WIDTH, HEIGHT, samples).unwrap();
        diff(&current, &background, 30).unwrap()
    }

    #[test]
    fn starts_falling_at_rest_origin() {
        let gate = MotionGate::new(params());
        assert_eq!(gate.state(), GateState::Falling);
        assert_eq!(gate.physics(), PhysicsState { position: 0.0, velocity: 0.0 });
    }

    #[test]
    fn free_fall_accelerates_every_tick() {
        let mut gate = MotionGate::new(params());
        let empty = mask_with(&[]);
        let mut previous = gate.physics();

        for _ in 0..10 {
            assert_eq!(gate.step(&empty), GateState::Falling);
            let now = gate.physics();
            assert!(now.position > previous.position);
            assert!((now.velocity - previous.velocity - 0.01).abs() < 1e-12);
            previous = now;
        }
        assert!((gate.physics().velocity - 0.1).abs() < 1e-12);
    }

    #[test]
    fn probe_hit_forces_bounce_velocity() {
        let mut gate = MotionGate::new(params());
        let empty = mask_with(&[]);
        for _ in 0..50 {
            gate.step(&empty);
        }
        let row = gate.probe_row().unwrap();
        let hit = mask_with(&[(WIDTH / 2, row)]);

        assert_eq!(gate.step(&hit), GateState::Bouncing);
        assert_eq!(gate.physics().velocity, -1.0);
    }

    #[test]
    fn bounce_ignores_prior_velocity() {
        for start_velocity in [-3.0, 0.0, 0.5, 7.25] {
            let mut gate = MotionGate::new(params());
            gate.physics = PhysicsState { position: 5.5, velocity: start_velocity };
            let hit = mask_with(&[(WIDTH / 2, 5)]);
            gate.step(&hit);
            assert_eq!(gate.physics().velocity, -1.0);
            assert_eq!(gate.physics().position, 4.5);
        }
    }

    #[test]
    fn flags_off_the_probe_column_are_ignored() {
        let mut gate = MotionGate::new(params());
        let elsewhere = mask_with(&[(0, 0), (WIDTH - 1, 0)]);
        assert_eq!(gate.step(&elsewhere), GateState::Falling);
        assert!(gate.physics().velocity > 0.0);
    }

    #[test]
    fn rests_past_lower_bound() {
        let mut gate = MotionGate::new(params());
        gate.physics = PhysicsState { position: 31.0, velocity: 2.0 };
        let empty = mask_with(&[]);
        assert_eq!(gate.step(&empty), GateState::Resting);
        assert_eq!(gate.physics(), PhysicsState { position: 31.0, velocity: 0.0 });

        assert_eq!(gate.step(&empty), GateState::Resting);
        assert_eq!(gate.physics().position, 31.0);
    }

    #[test]
    fn resting_object_can_be_lifted_again() {
        let mut gate = MotionGate::new(params());
        gate.physics = PhysicsState { position: 30.5, velocity: 0.0 };
        gate.state = GateState::Resting;

        let hit = mask_with(&[(WIDTH / 2, 30)]);
        assert_eq!(gate.step(&hit), GateState::Bouncing);
        assert_eq!(gate.physics().position, 29.5);

        let empty = mask_with(&[]);
        assert_eq!(gate.step(&empty), GateState::Bouncing);
        assert!((gate.physics().velocity - (-0.99)).abs() < 1e-12);
    }

    #[test]
    fn object_above_frame_never_hits() {
        let mut gate = MotionGate::new(params());
        gate.physics = PhysicsState { position: -4.0, velocity: -1.0 };
        assert_eq!(gate.probe_row(), None);
        let full = mask_with(&[(WIDTH / 2, 0), (WIDTH / 2, 1)]);
        assert_eq!(gate.step(&full), GateState::Falling);
    }
}
