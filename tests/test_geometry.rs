//! Property tests for placement math, page ranges and resource identifiers.

use pdf_stamp::editor::{apply_to_pages, PageRange, ResourceRegistry, VisualResource};
use pdf_stamp::geometry::{compute_placement, PlacementMode, Size};
use pdf_stamp::Error;
use proptest::prelude::*;
use std::f64::consts::FRAC_PI_4;

fn dimension() -> impl Strategy<Value = f64> {
    1.0f64..5000.0
}

proptest! {
    /// Property: a payload that fits is centered with no rotation
    #[test]
    fn centered_offsets_split_the_slack(
        width in dimension(),
        height in dimension(),
        w_frac in 0.0f64..=1.0,
        h_frac in 0.0f64..=1.0,
    ) {
        let payload = Size::new(width * w_frac, height * h_frac);
        let p = compute_placement(Size::new(width, height), payload, PlacementMode::Centered).unwrap();

        prop_assert!((p.tx - (width - payload.width) / 2.0).abs() < 1e-9);
        prop_assert!((p.ty - (height - payload.height) / 2.0).abs() < 1e-9);
        prop_assert_eq!(p.rotation, 0.0);
    }

    /// Property: the diagonal angle is atan(H/W) and the result is finite
    #[test]
    fn diagonal_rotation_follows_the_diagonal(
        width in dimension(),
        height in dimension(),
        pw in 0.0f64..2000.0,
        ph in 0.0f64..500.0,
    ) {
        let container = Size::new(width, height);
        let payload = Size::new(pw, ph);
        let p = compute_placement(container, payload, PlacementMode::DiagonalRotated).unwrap();

        prop_assert!((p.rotation - (height / width).atan()).abs() < 1e-12);
        prop_assert!(p.tx.is_finite() && p.ty.is_finite());

        let again = compute_placement(container, payload, PlacementMode::DiagonalRotated).unwrap();
        prop_assert_eq!(p, again);
    }

    /// Property: a zero-sized container side has no diagonal
    #[test]
    fn diagonal_rejects_flat_containers(
        side in dimension(),
        zero_width in any::<bool>(),
    ) {
        let container = if zero_width { Size::new(0.0, side) } else { Size::new(side, 0.0) };
        let result = compute_placement(container, Size::new(10.0, 10.0), PlacementMode::DiagonalRotated);
        let is_degenerate = matches!(result, Err(Error::DegenerateGeometry { .. }));
        prop_assert!(is_degenerate);
    }

    /// Property: valid spans visit exactly their pages, in order
    #[test]
    fn valid_spans_visit_each_page_once(
        page_count in 1usize..50,
        a in 0usize..50,
        b in 0usize..50,
    ) {
        let start = a.min(b) % page_count;
        let end = start + (a.max(b) - a.min(b)) % (page_count - start);

        let mut visited = Vec::new();
        let applied = apply_to_pages(PageRange::span(start, end), page_count, |index| {
            visited.push(index);
            Ok(())
        })
        .unwrap();

        prop_assert_eq!(applied, end - start + 1);
        prop_assert_eq!(visited, (start..=end).collect::<Vec<_>>());
    }

    /// Property: spans past the last page are rejected before any page is visited
    #[test]
    fn out_of_range_spans_touch_nothing(
        page_count in 0usize..20,
        start in 0usize..20,
        overshoot in 0usize..5,
    ) {
        let end = page_count + overshoot;
        let mut visited = 0;
        let result = apply_to_pages(PageRange::span(start.min(end), end), page_count, |_| {
            visited += 1;
            Ok(())
        });

        let is_invalid = matches!(result, Err(Error::InvalidRange { .. }));
        prop_assert!(is_invalid);
        prop_assert_eq!(visited, 0);
    }
}

#[test]
fn test_square_container_rotates_by_quarter_pi() {
    let p = compute_placement(
        Size::new(100.0, 100.0),
        Size::new(50.0, 50.0),
        PlacementMode::DiagonalRotated,
    )
    .unwrap();
    assert!((p.rotation - FRAC_PI_4).abs() < 1e-9);
}

#[test]
fn test_registry_issues_distinct_ids() {
    let mut registry = ResourceRegistry::new();
    let first = VisualResource::image((1, 0), Size::new(10.0, 10.0));
    let second = VisualResource::image((2, 0), Size::new(20.0, 5.0));

    let a = registry.register(first.clone()).unwrap();
    let b = registry.register(second.clone()).unwrap();
    assert_ne!(a, b);
    assert_eq!(registry.get(&a).unwrap(), &first);
    assert_eq!(registry.get(&b).unwrap(), &second);
}
