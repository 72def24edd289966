use approx::assert_abs_diff_eq;
use track_transform::core::{Action, perpendicular_distance, simplify};

fn reference_track() -> Vec<Action> {
    vec![
        Action::new(0, 0),
        Action::new(100, 50),
        Action::new(200, 10),
        Action::new(300, 90),
        Action::new(400, 50),
    ]
}

#[test]
fn reference_distances_from_baseline() {
    let track = reference_track();
    let (start, end) = (track[0], track[4]);

    // |x * 50 - y * 400| / hypot(400, 50)
    assert_abs_diff_eq!(
        perpendicular_distance(track[1], start, end),
        37.210_420_376_762_54,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        perpendicular_distance(track[2], start, end),
        14.884_168_150_705_015,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        perpendicular_distance(track[3], start, end),
        52.094_588_527_467_56,
        epsilon = 1e-9
    );
}

#[test]
fn reference_track_keeps_every_point_at_small_epsilon() {
    // split at (300,90) [52.09], then (200,10) [47.89], then (100,50) [44.94]
    assert_eq!(simplify(&reference_track(), 5.0), reference_track());
}

#[test]
fn reference_track_at_epsilon_45_drops_first_interior_point() {
    assert_eq!(
        simplify(&reference_track(), 45.0),
        vec![
            Action::new(0, 0),
            Action::new(200, 10),
            Action::new(300, 90),
            Action::new(400, 50),
        ]
    );
}

#[test]
fn reference_track_at_epsilon_50_keeps_only_the_peak() {
    assert_eq!(
        simplify(&reference_track(), 50.0),
        vec![Action::new(0, 0), Action::new(300, 90), Action::new(400, 50)]
    );
}

#[test]
fn reference_track_above_all_distances_collapses_to_endpoints() {
    assert_eq!(
        simplify(&reference_track(), 60.0),
        vec![Action::new(0, 0), Action::new(400, 50)]
    );
}

#[test]
fn collinear_points_collapse_at_zero_epsilon() {
    let points: Vec<Action> = (0..10).map(|i| Action::new(i * 100, i * 10)).collect();
    assert_eq!(
        simplify(&points, 0.0),
        vec![Action::new(0, 0), Action::new(900, 90)]
    );
}

#[test]
fn infinite_epsilon_collapses_to_endpoints() {
    let points = reference_track();
    assert_eq!(
        simplify(&points, f64::INFINITY),
        vec![Action::new(0, 0), Action::new(400, 50)]
    );
}

#[test]
fn zero_epsilon_keeps_an_off_line_point() {
    let points = vec![
        Action::new(0, 0),
        Action::new(100, 10),
        Action::new(200, 21),
        Action::new(300, 30),
    ];
    let out = simplify(&points, 0.0);
    assert!(out.len() >= 3);
    assert!(out.contains(&Action::new(200, 21)));
}

#[test]
fn coincident_endpoints_use_euclidean_distance() {
    let points = vec![
        Action::new(0, 50),
        Action::new(0, 53),
        Action::new(0, 50),
    ];
    assert_eq!(simplify(&points, 2.5), points);
    assert_eq!(
        simplify(&points, 3.0),
        vec![Action::new(0, 50), Action::new(0, 50)]
    );
}

#[test]
fn short_inputs_are_returned_unchanged() {
    assert!(simplify(&[], 1.0).is_empty());
    assert_eq!(
        simplify(&[Action::new(5, 5)], 1.0),
        vec![Action::new(5, 5)]
    );
}
