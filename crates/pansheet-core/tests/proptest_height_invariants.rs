#![forbid(unsafe_code)]

//! Property-based invariant tests for height resolution and drag primitives.
//!
//! 1. `short_form_y >= long_form_y` for every resolved anchor set.
//! 2. `hidden_form_y` equals the container height.
//! 3. `long_form_y` is never above the `MaxHeight` position plus top offset.
//! 4. Resolution is pure: resolving twice yields identical anchors.
//! 5. `ContentHeight(content_height_at(y))` resolves back to `y`.
//! 6. With assistive technology running, short and long forms coincide.
//! 7. Release classification depends only on speed, never on direction.
//! 8. `nearest` always returns one of its candidates.

use pansheet_core::drag::{ReleaseKind, classify_release, flick_threshold, nearest};
use pansheet_core::geometry::Size;
use pansheet_core::height::{Anchors, HeightContext, HeightSpec};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn context_strategy() -> impl Strategy<Value = HeightContext> {
    (200.0f64..1400.0, 0.0f64..120.0, 0.0f64..60.0).prop_map(|(height, top, bottom)| {
        HeightContext {
            container: Size::new(390.0, height),
            top_offset: top,
            bottom_inset: bottom,
        }
    })
}

fn spec_strategy() -> impl Strategy<Value = HeightSpec> {
    prop_oneof![
        Just(HeightSpec::MaxHeight),
        Just(HeightSpec::IntrinsicHeight),
        (0.0f64..600.0).prop_map(HeightSpec::MaxHeightWithTopInset),
        (0.0f64..2000.0).prop_map(HeightSpec::ContentHeight),
        (0.0f64..2000.0).prop_map(HeightSpec::ContentHeightIgnoringSafeArea),
    ]
}

fn resolve(ctx: &HeightContext, short: HeightSpec, long: HeightSpec, vo: bool, fit: f64) -> Anchors {
    Anchors::resolve(ctx, short, long, vo, |_| fit)
}

// ═══════════════════════════════════════════════════════════════════════
// 1-4, 6. Anchor invariants
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn anchors_are_ordered(
        ctx in context_strategy(),
        short in spec_strategy(),
        long in spec_strategy(),
        fit in 0.0f64..2000.0,
    ) {
        let anchors = resolve(&ctx, short, long, false, fit);
        prop_assert!(anchors.short_form_y >= anchors.long_form_y);
        prop_assert_eq!(anchors.hidden_form_y, ctx.container.height);
        let max_y = ctx.resolve(HeightSpec::MaxHeight, |_| fit) + ctx.top_offset;
        prop_assert!(anchors.long_form_y >= max_y);
    }

    #[test]
    fn resolution_is_pure(
        ctx in context_strategy(),
        short in spec_strategy(),
        long in spec_strategy(),
        vo in any::<bool>(),
        fit in 0.0f64..2000.0,
    ) {
        prop_assert_eq!(
            resolve(&ctx, short, long, vo, fit),
            resolve(&ctx, short, long, vo, fit)
        );
    }

    #[test]
    fn voice_over_collapses_short_form(
        ctx in context_strategy(),
        short in spec_strategy(),
        long in spec_strategy(),
    ) {
        let anchors = resolve(&ctx, short, long, true, 100.0);
        prop_assert_eq!(anchors.short_form_y, anchors.long_form_y);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Content height round trip
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn content_height_inverts_resolution(ctx in context_strategy(), y in -200.0f64..1200.0) {
        let height = ctx.content_height_at(y);
        let resolved = ctx.resolve(HeightSpec::ContentHeight(height), |_| 0.0);
        prop_assert!((resolved - y).abs() < 1e-9, "{resolved} != {y}");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 7-8. Drag primitives
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn classification_is_symmetric(
        velocity in -5000.0f64..5000.0,
        sensitivity in 0.0f64..=1.0,
    ) {
        prop_assert_eq!(
            classify_release(velocity, sensitivity, 1000.0),
            classify_release(-velocity, sensitivity, 1000.0)
        );
    }

    #[test]
    fn classification_matches_threshold(
        velocity in -5000.0f64..5000.0,
        sensitivity in 0.0f64..=1.0,
    ) {
        let expected = if velocity.abs() > flick_threshold(sensitivity, 1000.0) {
            ReleaseKind::Flick
        } else {
            ReleaseKind::Slow
        };
        prop_assert_eq!(classify_release(velocity, sensitivity, 1000.0), expected);
    }

    #[test]
    fn nearest_returns_a_candidate(
        value in -1000.0f64..2000.0,
        candidates in proptest::collection::vec(-1000.0f64..2000.0, 1..6),
    ) {
        let picked = nearest(value, &candidates);
        prop_assert!(candidates.contains(&picked));
        let best = (value - picked).abs();
        for c in &candidates {
            prop_assert!(best <= (value - c).abs());
        }
    }
}
