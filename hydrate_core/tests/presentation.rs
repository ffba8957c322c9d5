use hydrate_core::{
    BottleState, FrameRange, HydrationViewModel, PresentationCfg, PresentationMachine,
};
use hydrate_traits::LightMode;
use proptest::prelude::*;

fn vm(goal: f64, intake: f64, placed: bool) -> HydrationViewModel {
    HydrationViewModel {
        daily_goal: goal,
        today_intake: intake,
        bottle: BottleState {
            placed,
            ..BottleState::default()
        },
        ..HydrationViewModel::default()
    }
}

#[test]
fn intake_steps_play_contiguous_ranges() {
    let mut m = PresentationMachine::new(PresentationCfg::default());
    assert_eq!(m.advance(&vm(2000.0, 0.0, true)).play, None);
    assert_eq!(
        m.advance(&vm(2000.0, 500.0, true)).play,
        Some(FrameRange::new(0, 27))
    );
    assert_eq!(
        m.advance(&vm(2000.0, 1500.0, true)).play,
        Some(FrameRange::new(27, 82))
    );
    assert_eq!(m.current_frame(), 82);
}

#[test]
fn zero_goal_reads_as_empty() {
    let mut m = PresentationMachine::new(PresentationCfg::default());
    m.advance(&vm(2000.0, 1000.0, true));
    let t = m.advance(&vm(0.0, 1000.0, true));
    assert_eq!(t.play, Some(FrameRange::new(55, 0)));
}

#[test]
fn lifting_toggles_light_without_touching_frames() {
    let mut m = PresentationMachine::new(PresentationCfg::default());
    m.advance(&vm(2000.0, 500.0, true));

    let lifted = m.advance(&vm(2000.0, 500.0, false));
    assert!(lifted.light_changed);
    assert_eq!(lifted.play, None);
    assert_eq!(lifted.state.mode, LightMode::Breath);
    assert_eq!(lifted.state.color, "yellow");
    assert_eq!(m.current_frame(), 27);

    let back = m.advance(&vm(2000.0, 500.0, true));
    assert!(back.light_changed);
    assert_eq!(back.state.mode, LightMode::Solid);
    assert_eq!(back.state.color, "#008000");
}

#[test]
fn unchanged_snapshot_is_quiet() {
    let mut m = PresentationMachine::new(PresentationCfg::default());
    m.advance(&vm(2000.0, 800.0, true));
    let t = m.advance(&vm(2000.0, 800.0, true));
    assert!(!t.light_changed);
    assert_eq!(t.play, None);
}

#[test]
fn intake_over_goal_stops_at_last_frame() {
    let cfg = PresentationCfg {
        total_frames: 60,
        ..PresentationCfg::default()
    };
    let mut m = PresentationMachine::new(cfg);
    let t = m.advance(&vm(1000.0, 5000.0, true));
    assert_eq!(t.play, Some(FrameRange::new(0, 60)));
}

proptest! {
    #[test]
    fn next_range_starts_where_previous_ended(
        goal in 0.0f64..4000.0,
        intakes in prop::collection::vec(0.0f64..5000.0, 1..40),
        frames in 1u32..300,
    ) {
        let cfg = PresentationCfg { total_frames: frames, ..PresentationCfg::default() };
        let mut m = PresentationMachine::new(cfg);
        let mut prev_end = 0u32;
        for intake in intakes {
            let t = m.advance(&vm(goal, intake, true));
            prop_assert_eq!(t.state.animation_range.start, prev_end);
            prop_assert!(t.state.animation_range.end <= frames);
            prev_end = t.state.animation_range.end;
        }
    }
}
