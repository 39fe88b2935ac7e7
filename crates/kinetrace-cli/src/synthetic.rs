//! Synthetic motion source for demo recordings and soak runs

use kinetrace_core::{ControllerState, InputState, Pose, Sample, SourceAdapter};

/// Deterministic standing-user motion: the head bobs and yaws gently, the
/// controllers swing in opposite phase at waist height, the right trigger
/// follows a slow sine, and button A pulses once per second.
///
/// Like a real adapter, the source holds whatever frame was last pushed into
/// it: [`advance`] synthesizes and stores the frame for a point in time, and
/// `sample_at` converts the stored frame at the requested timestamp. Before
/// the first advance it reports the default untracked sample. Same advance
/// time, same frame - runs are reproducible.
///
/// [`advance`]: SyntheticSource::advance
pub struct SyntheticSource {
    current: Option<Sample>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Synthesize and store the frame for the given point in time
    pub fn advance(&mut self, time: f64) {
        let t = time as f32;
        let swing = (1.1 * t).sin() * 0.25;

        let head = Pose::new(
            [0.05 * (0.8 * t).sin(), 1.65 + 0.02 * (1.3 * t).sin(), 0.0],
            yaw_quat(0.3 * (0.25 * t).sin()),
        );
        let left = ControllerState {
            tracked: true,
            pose: Pose::new([-0.20, 1.05 + swing * 0.1, -0.30 + swing], yaw_quat(swing)),
            trigger: 0.0,
        };
        let right = ControllerState {
            tracked: true,
            pose: Pose::new([0.20, 1.05 - swing * 0.1, -0.30 - swing], yaw_quat(-swing)),
            trigger: (2.0 * t).sin() * 0.5 + 0.5,
        };
        let input = InputState {
            button_a: time.fract() < 0.1,
            ..InputState::default()
        };

        self.current = Some(Sample {
            timestamp: time,
            head,
            left,
            right,
            input,
        });
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

fn yaw_quat(angle: f32) -> [f32; 4] {
    let half = angle / 2.0;
    [0.0, half.sin(), 0.0, half.cos()]
}

impl SourceAdapter for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn sample_at(&self, timestamp: f64) -> Sample {
        match &self.current {
            Some(frame) => Sample {
                timestamp,
                ..frame.clone()
            },
            None => Sample::at(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_before_first_advance() {
        let source = SyntheticSource::new();
        let sample = source.sample_at(2.0);
        assert_eq!(sample.timestamp, 2.0);
        assert!(!sample.left.tracked);
        assert!(!sample.right.tracked);
        assert_eq!(sample.head, Pose::default());
    }

    #[test]
    fn advance_makes_controllers_tracked() {
        let mut source = SyntheticSource::new();
        source.advance(0.5);
        let sample = source.sample_at(0.5);
        assert!(sample.left.tracked);
        assert!(sample.right.tracked);
        assert!((0.0..=1.0).contains(&sample.right.trigger));
    }

    #[test]
    fn sample_at_restamps_the_stored_frame() {
        let mut source = SyntheticSource::new();
        source.advance(1.0);

        let stamped = source.sample_at(9.0);
        let reference = source.sample_at(1.0);
        assert_eq!(stamped.timestamp, 9.0);
        assert_eq!(stamped.head, reference.head);
        assert_eq!(stamped.left, reference.left);
        assert_eq!(stamped.right, reference.right);
    }

    #[test]
    fn frames_are_deterministic() {
        let mut a = SyntheticSource::new();
        let mut b = SyntheticSource::new();
        a.advance(1.25);
        b.advance(1.25);
        assert_eq!(a.sample_at(1.25), b.sample_at(1.25));
    }

    #[test]
    fn button_a_pulses_once_per_second() {
        let mut source = SyntheticSource::new();
        source.advance(3.05);
        assert!(source.sample_at(3.05).input.button_a);
        source.advance(3.50);
        assert!(!source.sample_at(3.50).input.button_a);
    }

    #[test]
    fn orientations_stay_normalized() {
        let mut source = SyntheticSource::new();
        source.advance(2.0);
        let sample = source.sample_at(2.0);
        for q in [
            sample.head.orientation,
            sample.left.pose.orientation,
            sample.right.pose.orientation,
        ] {
            let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }
}
