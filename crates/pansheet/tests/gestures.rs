#![forbid(unsafe_code)]

//! Pan gesture scenarios: drag increments, releases, admission and
//! arbitration with the embedded scroll surface.

use pansheet::interpreter::PanRecognizer;
use pansheet::presentable::PresentableConfig;
use pansheet::scroll::SurfaceId;
use pansheet::{PresentationState, SheetConfig};
use pansheet_core::drag::GesturePhase;
use pansheet_core::geometry::{Point, Vector};
use pansheet_core::height::HeightSpec;
use pansheet_harness::{HookEvent, SheetFixture, standard_config};

const LONG: f64 = 47.0;
const SHORT: f64 = 510.0;
const HIDDEN: f64 = 844.0;

fn at(state: PresentationState) -> SheetFixture {
    let f = SheetFixture::attached(standard_config());
    f.sheet.transition(state, false);
    f.hooks.take();
    f
}

#[test]
fn drag_down_from_long_form_moves_by_delta() {
    let f = at(PresentationState::Long);
    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), LONG + 40.0);
    assert_eq!(f.recognizer.translation(), Vector::ZERO);
    assert_eq!(f.hooks.events(), vec![HookEvent::WillRespond]);
}

#[test]
fn drag_above_long_form_is_resisted() {
    let config = PresentableConfig::new()
        .heights(HeightSpec::ContentHeight(300.0), HeightSpec::MaxHeightWithTopInset(100.0))
        .anchor_to_long_form(false);
    let f = SheetFixture::attached(config);
    f.sheet.transition(PresentationState::Long, false);
    let long = f.sheet.anchors().long_form_y;
    assert_eq!(long, 147.0);

    f.drag(GesturePhase::Began, -10.0);
    assert_eq!(f.sheet.current_y(), long - 10.0);

    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), long + 10.0);
}

#[test]
fn resisted_drag_is_still_clamped() {
    let config = PresentableConfig::new()
        .heights(HeightSpec::ContentHeight(300.0), HeightSpec::MaxHeightWithTopInset(100.0))
        .anchor_to_long_form(false);
    let f = SheetFixture::attached(config);
    f.sheet.transition(PresentationState::Long, false);
    f.drag(GesturePhase::Changed, -500.0);
    assert_eq!(f.sheet.current_y(), f.sheet.anchored_y());
}

#[test]
fn custom_overdrag_resistance() {
    let config = PresentableConfig::new()
        .heights(HeightSpec::ContentHeight(300.0), HeightSpec::MaxHeightWithTopInset(100.0))
        .anchor_to_long_form(false);
    let sheet_config = SheetConfig {
        overdrag_resistance: 4.0,
        ..SheetConfig::default()
    };
    let f = SheetFixture::build(config, sheet_config, |p| p);
    f.attach();
    f.sheet.transition(PresentationState::Long, false);
    f.drag(GesturePhase::Changed, -10.0);
    f.drag(GesturePhase::Changed, -40.0);
    assert_eq!(f.sheet.current_y(), 147.0 - 10.0 - 10.0);
}

#[test]
fn drag_at_anchor_announces_long_form() {
    let f = at(PresentationState::Long);
    f.drag(GesturePhase::Changed, -20.0);
    assert_eq!(f.sheet.current_y(), LONG);
    assert_eq!(
        f.hooks.events(),
        vec![
            HookEvent::WillRespond,
            HookEvent::WillTransition(PresentationState::Long)
        ]
    );
}

#[test]
fn upward_flick_goes_long() {
    let f = at(PresentationState::Short);
    f.release(-500.0);
    assert_eq!(f.sheet.state(), PresentationState::Long);
    assert_eq!(f.sheet.current_y(), LONG);
    assert!(f.sheet.is_animating());
    f.settle();
    assert!(!f.sheet.is_animating());
}

#[test]
fn threshold_velocity_is_a_slow_release() {
    let f = at(PresentationState::Short);
    f.drag(GesturePhase::Changed, 90.0);
    assert_eq!(f.sheet.current_y(), 600.0);
    f.release(300.0);
    assert_eq!(f.sheet.state(), PresentationState::Short);
}

#[test]
fn just_over_threshold_is_a_flick() {
    let f = at(PresentationState::Short);
    f.drag(GesturePhase::Changed, 90.0);
    f.release(300.0001);
    assert_eq!(f.sheet.state(), PresentationState::Hidden);
    assert_eq!(f.sheet.current_y(), HIDDEN);
}

#[test]
fn downward_flick_from_long_form_stops_at_short() {
    let f = at(PresentationState::Long);
    f.drag(GesturePhase::Changed, 100.0);
    f.release(900.0);
    assert_eq!(f.sheet.state(), PresentationState::Short);
}

#[test]
fn slow_release_snaps_to_nearest_anchor() {
    let f = at(PresentationState::Short);
    f.drag(GesturePhase::Changed, -400.0);
    assert_eq!(f.sheet.current_y(), 110.0);
    f.release(0.0);
    assert_eq!(f.sheet.state(), PresentationState::Long);
}

#[test]
fn slow_release_near_bottom_hides() {
    let f = at(PresentationState::Short);
    f.drag(GesturePhase::Changed, 250.0);
    f.release(0.0);
    assert_eq!(f.sheet.state(), PresentationState::Hidden);
}

#[test]
fn drag_to_dismiss_disabled_keeps_sheet_visible() {
    let f = SheetFixture::attached(standard_config().drag_to_dismiss(false));
    f.sheet.transition(PresentationState::Short, false);
    f.drag(GesturePhase::Changed, 250.0);
    f.release(0.0);
    assert_eq!(f.sheet.state(), PresentationState::Short);

    f.settle();
    f.drag(GesturePhase::Changed, 250.0);
    f.release(2000.0);
    assert_eq!(f.sheet.state(), PresentationState::Short);
}

#[test]
fn cancelled_gesture_settles_like_a_release() {
    let f = at(PresentationState::Short);
    f.drag(GesturePhase::Changed, 250.0);
    f.recognizer.set_phase(GesturePhase::Cancelled);
    f.recognizer.set_velocity(Vector::ZERO);
    f.sheet.gesture_target().handle(&f.recognizer);
    assert_eq!(f.sheet.state(), PresentationState::Hidden);
}

#[test]
fn presentable_veto_on_began_resets_recognizer() {
    let f = SheetFixture::build(standard_config(), SheetConfig::default(), |p| {
        p.on_should_respond(|_| false)
    });
    f.attach();
    f.sheet.transition(PresentationState::Short, false);

    f.drag(GesturePhase::Began, 40.0);
    assert_eq!(f.recognizer.resets(), 1);
    assert_eq!(f.recognizer.translation(), Vector::ZERO);
    assert_eq!(f.sheet.current_y(), SHORT);
}

#[test]
fn presentable_veto_applies_only_at_gesture_start() {
    let f = SheetFixture::build(standard_config(), SheetConfig::default(), |p| {
        p.on_should_respond(|_| false)
    });
    f.attach();
    f.sheet.transition(PresentationState::Short, false);

    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.recognizer.resets(), 0);
    assert_eq!(f.sheet.current_y(), SHORT + 40.0);
}

#[test]
fn scrolled_content_keeps_touches_inside_it() {
    let f = at(PresentationState::Long);
    assert!(f.sheet.is_anchored());
    f.scroll.set_offset_silently(100.0);
    f.recognizer.set_location(Point::new(100.0, 300.0));

    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), LONG);
    assert_eq!(f.recognizer.translation(), Vector::ZERO);
    assert!(f.hooks.events().is_empty());
}

#[test]
fn touches_outside_scrolled_content_drag_the_sheet() {
    let f = at(PresentationState::Long);
    f.scroll.set_offset_silently(100.0);
    f.recognizer.set_location(Point::new(100.0, 820.0));
    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), LONG + 40.0);
}

#[test]
fn active_scrolling_claims_touches_anywhere() {
    let f = at(PresentationState::Long);
    f.scroll.set_offset_silently(100.0);
    f.scroll.set_tracking(true);
    f.recognizer.set_location(Point::new(100.0, 820.0));
    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), LONG);
}

#[test]
fn content_at_top_lets_the_sheet_move() {
    let f = at(PresentationState::Long);
    f.recognizer.set_location(Point::new(100.0, 300.0));
    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), LONG + 40.0);
}

#[test]
fn prioritized_sheet_gesture_resets_scroll_pan() {
    let f = SheetFixture::build(standard_config(), SheetConfig::default(), |p| {
        p.on_should_prioritize(|_| true)
    });
    f.attach();
    f.sheet.transition(PresentationState::Long, false);
    f.scroll.set_offset_silently(100.0);
    f.recognizer.set_location(Point::new(100.0, 300.0));

    f.drag(GesturePhase::Began, 40.0);
    assert_eq!(f.scroll.pan_resets(), 1);
    assert_eq!(f.sheet.current_y(), LONG + 40.0);
}

#[test]
fn user_interaction_disabled_ignores_gestures() {
    let config = PresentableConfig {
        is_user_interaction_enabled: false,
        ..standard_config()
    };
    let f = SheetFixture::attached(config);
    f.sheet.transition(PresentationState::Short, false);
    f.drag(GesturePhase::Changed, 40.0);
    assert_eq!(f.sheet.current_y(), SHORT);
    assert_eq!(f.recognizer.translation(), Vector::ZERO);
}

#[test]
fn gestures_before_attach_are_ignored() {
    let f = SheetFixture::new(standard_config());
    f.drag(GesturePhase::Changed, 40.0);
    f.release(-900.0);
    assert_eq!(f.sheet.state(), PresentationState::Hidden);
    assert_eq!(f.animator.request_count(), 0);
}

#[test]
fn simultaneous_recognition_only_with_scroll_surface() {
    let f = at(PresentationState::Long);
    let target = f.target();
    assert!(target.should_recognize_simultaneously(Some(SurfaceId(1))));
    assert!(!target.should_recognize_simultaneously(Some(SurfaceId(2))));
    assert!(!target.should_recognize_simultaneously(None));
    assert!(!target.should_be_required_to_fail_by(Some(SurfaceId(1))));
    assert!(!target.should_be_required_to_fail_by(None));
}

#[test]
fn custom_sensitivity_changes_flick_threshold() {
    let sheet_config = SheetConfig {
        snap_movement_sensitivity: 0.9,
        ..SheetConfig::default()
    };
    let f = SheetFixture::build(standard_config(), sheet_config, |p| p);
    f.attach();
    f.sheet.transition(PresentationState::Short, false);
    f.drag(GesturePhase::Changed, 90.0);
    // Threshold is now 100 px/s.
    f.release(150.0);
    assert_eq!(f.sheet.state(), PresentationState::Hidden);
}
