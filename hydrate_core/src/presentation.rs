//! Presentation state machine.
//!
//! Maps each view-model snapshot to a light mode/colour and a frame range
//! for the fill animation. The range always starts where the previous one
//! ended, so playback never jumps.

use crate::config::PresentationCfg;
use crate::types::{FrameRange, HydrationViewModel, PresentationState};
use hydrate_traits::LightMode;

/// Intake as a percentage of the goal, clamped to `[0, 100]`.
/// A zero (or otherwise unusable) goal yields 0.
pub fn percent_of_goal(intake: f64, goal: f64) -> f64 {
    if !goal.is_finite() || goal <= 0.0 || !intake.is_finite() {
        return 0.0;
    }
    (intake / goal * 100.0).clamp(0.0, 100.0)
}

/// Animation frame for a percentage: `floor(percent / 100 * total_frames)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn frame_for(percent: f64, total_frames: u32) -> u32 {
    let pct = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let frame = (pct / 100.0 * f64::from(total_frames)).floor();
    (frame as u32).min(total_frames)
}

/// Output of one `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PresentationState,
    /// Frame range to play; `None` when the frame did not move.
    pub play: Option<FrameRange>,
    /// Light mode or colour must be (re)applied.
    pub light_changed: bool,
}

#[derive(Debug, Clone)]
pub struct PresentationMachine {
    cfg: PresentationCfg,
    state: PresentationState,
    light_applied: bool,
}

impl PresentationMachine {
    pub fn new(cfg: PresentationCfg) -> Self {
        let state = PresentationState {
            mode: LightMode::Solid,
            color: cfg.placed_color.clone(),
            animation_range: FrameRange::default(),
        };
        Self {
            cfg,
            state,
            light_applied: false,
        }
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn config(&self) -> &PresentationCfg {
        &self.cfg
    }

    /// Frame the animation rests on after the last instruction.
    pub fn current_frame(&self) -> u32 {
        self.state.animation_range.end
    }

    fn color_for(&self, placed: bool) -> &str {
        if placed {
            &self.cfg.placed_color
        } else {
            &self.cfg.lifted_color
        }
    }

    /// Derive the next presentation state from a view-model snapshot.
    pub fn advance(&mut self, vm: &HydrationViewModel) -> Transition {
        let percent = percent_of_goal(vm.today_intake, vm.daily_goal);
        let frame = frame_for(percent, self.cfg.total_frames);
        let range = FrameRange::new(self.current_frame(), frame);

        let mode = vm.bottle.mode();
        let color = self.color_for(vm.bottle.placed).to_string();
        let light_changed =
            !self.light_applied || mode != self.state.mode || color != self.state.color;

        self.state = PresentationState {
            mode,
            color,
            animation_range: range,
        };
        self.light_applied = true;

        Transition {
            state: self.state.clone(),
            play: (!range.is_empty()).then_some(range),
            light_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_degenerate_goal() {
        assert_eq!(percent_of_goal(500.0, 0.0), 0.0);
        assert_eq!(percent_of_goal(500.0, -10.0), 0.0);
        assert_eq!(percent_of_goal(500.0, 2000.0), 25.0);
        assert_eq!(percent_of_goal(5000.0, 2000.0), 100.0);
        assert_eq!(percent_of_goal(-20.0, 2000.0), 0.0);
    }

    #[test]
    fn frame_is_floored_and_bounded() {
        assert_eq!(frame_for(25.0, 110), 27);
        assert_eq!(frame_for(75.0, 110), 82);
        assert_eq!(frame_for(100.0, 110), 110);
        assert_eq!(frame_for(f64::NAN, 110), 0);
        assert_eq!(frame_for(0.0, 1), 0);
    }

    #[test]
    fn first_advance_applies_light_without_playing() {
        let mut m = PresentationMachine::new(PresentationCfg::default());
        let t = m.advance(&HydrationViewModel::default());
        assert!(t.light_changed);
        assert_eq!(t.play, None);
        assert_eq!(t.state.mode, LightMode::Solid);
        assert_eq!(t.state.color, "#008000");

        let again = m.advance(&HydrationViewModel::default());
        assert!(!again.light_changed);
    }
}
