use roadgen::geometry::{
    CircularLane, Lane, LaneAttributes, LaneGeometry, Point, StraightLane, Turn, FOOTPRINT_END_MARGIN,
    FOOTPRINT_RESOLUTION,
};
use roadgen::RoadGenError;
use std::f64::consts::{FRAC_PI_2, PI};

use anyhow::Result;
use geo::BoundingRect;

const TOLERANCE: f64 = 1e-6;

fn assert_round_trip(lane: &impl LaneGeometry, lateral_span: f64) {
    let length = lane.length();
    for i in 0..=10 {
        let longitudinal = length * i as f64 / 10.0;
        for lateral in [-lateral_span, -0.5, 0.0, 0.7, lateral_span] {
            let world = lane.position(longitudinal, lateral);
            let (l, t) = lane.local_coordinates(&world);
            assert!(
                (l - longitudinal).abs() < TOLERANCE && (t - lateral).abs() < TOLERANCE,
                "({}, {}) came back as ({}, {})",
                longitudinal,
                lateral,
                l,
                t
            );
        }
    }
}

/// Test that straight lane positions map back to the same lane coordinates
#[test]
fn test_straight_lane_round_trip() -> Result<()> {
    let lane = StraightLane::new(Point::new(3.0, -2.0), Point::new(-17.0, 40.0), LaneAttributes::default())?;
    assert_round_trip(&lane, 1.75);
    Ok(())
}

/// Test that a straight lane caches length, heading and directions
#[test]
fn test_straight_lane_derived_fields() -> Result<()> {
    let lane = StraightLane::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0), LaneAttributes::default())?;
    assert!((lane.length() - 10.0).abs() < TOLERANCE);
    assert!((lane.heading() - FRAC_PI_2).abs() < TOLERANCE);
    assert!((lane.direction().y - 1.0).abs() < TOLERANCE);
    // Lateral is the counterclockwise normal, so it points to -x here
    assert!((lane.direction_lateral().x + 1.0).abs() < TOLERANCE);
    assert!((lane.position(5.0, 2.0) - Point::new(-2.0, 5.0)).norm() < TOLERANCE);
    assert!((lane.width_at(3.0) - 3.5).abs() < TOLERANCE);
    assert_eq!(lane.start_point(), Point::new(0.0, 0.0));
    assert_eq!(lane.end_point(), Point::new(0.0, 10.0));
    Ok(())
}

/// Test that moving a lane's end points recomputes every derived field
#[test]
fn test_reset_start_end_recomputes_everything() -> Result<()> {
    let mut lane = StraightLane::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), LaneAttributes::default())?;
    lane.reset_start_end(Point::new(0.0, 0.0), Point::new(0.0, -4.0))?;

    assert!((lane.length() - 4.0).abs() < TOLERANCE);
    assert!((lane.heading() + FRAC_PI_2).abs() < TOLERANCE);
    assert!((lane.direction().y + 1.0).abs() < TOLERANCE);
    assert!((lane.direction_lateral().x - 1.0).abs() < TOLERANCE);
    assert!((lane.end() - Point::new(0.0, -4.0)).norm() < TOLERANCE);
    assert_round_trip(&lane, 1.0);
    Ok(())
}

/// Test that zero-length straight lanes are rejected
#[test]
fn test_degenerate_straight_lane_is_rejected() -> Result<()> {
    let p = Point::new(1.0, 1.0);
    let err = StraightLane::new(p, p, LaneAttributes::default()).unwrap_err();
    assert!(matches!(err, RoadGenError::DegenerateGeometry(_)));

    // A failed reset leaves the lane as it was
    let mut lane = StraightLane::new(p, Point::new(5.0, 1.0), LaneAttributes::default())?;
    assert!(lane.reset_start_end(p, p).is_err());
    assert!((lane.length() - 4.0).abs() < TOLERANCE);
    Ok(())
}

/// Test that arc positions map back to the same lane coordinates for both turns
#[test]
fn test_circular_lane_round_trip_both_turns() -> Result<()> {
    for turn in [Turn::Left, Turn::Right] {
        let lane = CircularLane::from_tangent(
            Point::new(10.0, 5.0),
            0.3,
            25.0,
            PI * 0.6,
            turn,
            LaneAttributes::default(),
        )?;
        assert!((lane.length() - 25.0 * PI * 0.6).abs() < TOLERANCE);
        assert!((lane.start() - Point::new(10.0, 5.0)).norm() < TOLERANCE);
        assert!((lane.heading_at(0.0) - 0.3).abs() < TOLERANCE);
        assert_round_trip(&lane, 1.75);
    }
    Ok(())
}

/// Test that left arcs run counterclockwise and right arcs clockwise
#[test]
fn test_circular_lane_heading_follows_turn() -> Result<()> {
    let left = CircularLane::from_tangent(Point::origin(), 0.0, 20.0, FRAC_PI_2, Turn::Left, LaneAttributes::default())?;
    assert!((left.end() - Point::new(20.0, 20.0)).norm() < TOLERANCE);
    assert!((left.heading_at(left.length()) - FRAC_PI_2).abs() < TOLERANCE);
    assert!(!left.is_clockwise());
    let (start, end) = left.phases();
    assert!((start + FRAC_PI_2).abs() < TOLERANCE);
    assert!(end.abs() < TOLERANCE);

    let right =
        CircularLane::from_tangent(Point::origin(), 0.0, 20.0, FRAC_PI_2, Turn::Right, LaneAttributes::default())?;
    assert!((right.end() - Point::new(20.0, -20.0)).norm() < TOLERANCE);
    assert!((right.heading_at(right.length()) + FRAC_PI_2).abs() < TOLERANCE);
    assert!(right.is_clockwise());
    let (start, end) = right.phases();
    assert!((start - FRAC_PI_2).abs() < TOLERANCE);
    assert!(end.abs() < TOLERANCE);
    Ok(())
}

/// Test that arcs too tight, swept the wrong way or closed on themselves are rejected
#[test]
fn test_circular_lane_rejects_bad_arcs() {
    let attributes = LaneAttributes::default();
    let too_tight = CircularLane::new(Point::origin(), 1.0, 0.0, 1.0, false, attributes.clone());
    assert!(matches!(too_tight, Err(RoadGenError::DegenerateGeometry(_))));

    let wrong_way = CircularLane::new(Point::origin(), 20.0, 0.0, 1.0, true, attributes.clone());
    assert!(matches!(wrong_way, Err(RoadGenError::DegenerateGeometry(_))));

    let full_circle = CircularLane::new(Point::origin(), 20.0, 0.0, 2.0 * PI, false, attributes);
    assert!(matches!(full_circle, Err(RoadGenError::DegenerateGeometry(_))));
}

/// Test that a lane footprint spans the lane minus its end margins
#[test]
fn test_footprint_covers_lane_minus_end_margins() -> Result<()> {
    let lane: Lane = StraightLane::new(Point::origin(), Point::new(10.0, 0.0), LaneAttributes::with_width(3.0))?.into();
    let pieces = lane.footprint(FOOTPRINT_RESOLUTION, FOOTPRINT_END_MARGIN);
    assert!(!pieces.is_empty());

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for piece in &pieces {
        let rect = piece.bounding_rect().expect("quad has bounds");
        min_x = min_x.min(rect.min().x);
        max_x = max_x.max(rect.max().x);
        assert!((rect.height() - 3.0).abs() < TOLERANCE);
    }
    assert!((min_x - FOOTPRINT_END_MARGIN).abs() < TOLERANCE);
    assert!((max_x - (10.0 - FOOTPRINT_END_MARGIN)).abs() < TOLERANCE);
    Ok(())
}
