#![allow(clippy::float_cmp)]

use super::*;

fn r(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, w, h)
}

// =============================================================
// overlap
// =============================================================

#[test]
fn touching_edges_do_not_overlap() {
    let a = r(0.0, 0.0, 10.0, 10.0);
    let b = r(10.0, 0.0, 10.0, 10.0);
    assert_eq!(overlap(&a, &b), None);
}

#[test]
fn one_pixel_crossing_overlaps() {
    let a = r(0.0, 0.0, 10.0, 10.0);
    let b = r(9.0, 0.0, 10.0, 10.0);
    assert_eq!(overlap(&a, &b), Some(r(9.0, 0.0, 1.0, 10.0)));
}

#[test]
fn overlap_is_order_independent() {
    let cases = [
        (r(0.0, 0.0, 50.0, 50.0), r(25.0, 25.0, 50.0, 50.0)),
        (r(0.0, 0.0, 10.0, 10.0), r(10.0, 0.0, 10.0, 10.0)),
        (r(5.0, 5.0, 100.0, 20.0), r(0.0, 0.0, 30.0, 300.0)),
        (r(0.0, 0.0, 10.0, 10.0), r(50.0, 50.0, 10.0, 10.0)),
        (r(0.0, 0.0, 100.0, 100.0), r(10.0, 10.0, 5.0, 5.0)),
    ];
    for (a, b) in cases {
        assert_eq!(overlap(&a, &b), overlap(&b, &a), "a={a:?} b={b:?}");
    }
}

#[test]
fn contained_rect_overlap_is_the_inner_rect() {
    let outer = r(0.0, 0.0, 100.0, 100.0);
    let inner = r(10.0, 20.0, 5.0, 6.0);
    assert_eq!(overlap(&outer, &inner), Some(inner));
}

#[test]
fn corner_touch_is_not_overlap() {
    let a = r(0.0, 0.0, 10.0, 10.0);
    let b = r(10.0, 10.0, 10.0, 10.0);
    assert_eq!(overlap(&a, &b), None);
}

#[test]
fn disjoint_rects_do_not_overlap() {
    assert_eq!(overlap(&r(0.0, 0.0, 50.0, 50.0), &r(100.0, 100.0, 10.0, 10.0)), None);
}

// =============================================================
// Rect helpers
// =============================================================

#[test]
fn rect_edges() {
    let rect = r(10.0, 20.0, 30.0, 40.0);
    assert_eq!(rect.right(), 40.0);
    assert_eq!(rect.bottom(), 60.0);
}

#[test]
fn rect_contains_is_half_open() {
    let rect = r(0.0, 0.0, 10.0, 10.0);
    assert!(rect.contains(Point::new(0.0, 0.0)));
    assert!(rect.contains(Point::new(9.9, 9.9)));
    assert!(!rect.contains(Point::new(10.0, 5.0)));
    assert!(!rect.contains(Point::new(5.0, -1.0)));
}

// =============================================================
// clamping
// =============================================================

#[test]
fn clamp_pulls_negative_origin_to_zero() {
    let limits = GeometryLimits::default();
    let clamped = limits.clamp(r(-5.0, -0.5, 300.0, 300.0));
    assert_eq!(clamped, r(0.0, 0.0, 300.0, 300.0));
}

#[test]
fn clamp_raises_sizes_to_minimums() {
    let limits = GeometryLimits::default();
    let clamped = limits.clamp(r(10.0, 10.0, 20.0, 5.0));
    assert_eq!(clamped.width, 100.0);
    assert_eq!(clamped.height, 80.0);
}

#[test]
fn clamp_is_idempotent() {
    let limits = GeometryLimits { min_width: 120.0, min_height: 90.0 };
    let inputs = [
        r(-10.0, -20.0, 0.0, 0.0),
        r(0.0, 0.0, 120.0, 90.0),
        r(5.0, 7.0, 119.9, 1000.0),
        r(-0.0, 3.0, -50.0, -50.0),
        r(1e9, 1e9, 1e9, 1e9),
    ];
    for input in inputs {
        let once = limits.clamp(input);
        let twice = limits.clamp(once);
        assert_eq!(once, twice, "input={input:?}");
    }
}

#[test]
fn custom_limits_apply() {
    let limits = GeometryLimits { min_width: 40.0, min_height: 30.0 };
    assert_eq!(limits.clamp_width(10.0), 40.0);
    assert_eq!(limits.clamp_height(10.0), 30.0);
    assert_eq!(limits.clamp_width(100.0), 100.0);
}

// =============================================================
// grid snap
// =============================================================

#[test]
fn snap_rounds_to_nearest_multiple() {
    assert_eq!(snap_to_grid(103.0, 20), 100.0);
    assert_eq!(snap_to_grid(111.0, 20), 120.0);
    assert_eq!(snap_to_grid(0.0, 20), 0.0);
}

#[test]
fn snap_with_zero_grid_is_identity() {
    assert_eq!(snap_to_grid(57.3, 0), 57.3);
}
