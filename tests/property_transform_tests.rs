use proptest::prelude::*;
use track_transform::core::{
    Action, POSITION_MAX, POSITION_MIN, extend_run, extend_selection, simplify,
};

fn track_strategy(min_len: usize) -> impl Strategy<Value = Vec<Action>> {
    proptest::collection::vec((1i32..500, 0i32..=100), min_len..64).prop_map(|steps| {
        let mut at = 0;
        steps
            .into_iter()
            .map(|(gap, pos)| {
                at += gap;
                Action::new(at, pos)
            })
            .collect()
    })
}

fn is_subsequence(candidate: &[Action], source: &[Action]) -> bool {
    let mut remaining = source.iter();
    candidate
        .iter()
        .all(|wanted| remaining.any(|action| action == wanted))
}

proptest! {
    #[test]
    fn simplify_keeps_endpoints_and_order(
        points in track_strategy(2),
        epsilon in 0.0f64..200.0
    ) {
        let out = simplify(&points, epsilon);
        prop_assert!(out.len() >= 2);
        prop_assert!(out.len() <= points.len());
        prop_assert_eq!(out.first(), points.first());
        prop_assert_eq!(out.last(), points.last());
        prop_assert!(is_subsequence(&out, &points));
    }

    #[test]
    fn simplify_is_deterministic(
        points in track_strategy(2),
        epsilon in 0.0f64..50.0
    ) {
        prop_assert_eq!(simplify(&points, epsilon), simplify(&points, epsilon));
    }

    #[test]
    fn simplify_with_unbounded_epsilon_keeps_only_endpoints(points in track_strategy(2)) {
        let out = simplify(&points, f64::MAX);
        prop_assert_eq!(out, vec![points[0], points[points.len() - 1]]);
    }

    #[test]
    fn simplify_output_is_stable_when_reapplied(
        points in track_strategy(2),
        epsilon in 0.0f64..50.0
    ) {
        let once = simplify(&points, epsilon);
        let twice = simplify(&once, epsilon);
        prop_assert!(is_subsequence(&twice, &once));
        prop_assert_eq!(twice.first(), once.first());
        prop_assert_eq!(twice.last(), once.last());
    }

    #[test]
    fn zero_range_extension_is_identity(points in track_strategy(1)) {
        prop_assert_eq!(extend_run(&points, 0), points.clone());
        prop_assert_eq!(extend_selection(&points, |_| true, 0), points);
    }

    #[test]
    fn range_extension_clamps_and_keeps_run_endpoints(
        points in track_strategy(3),
        delta in -200i32..200
    ) {
        let out = extend_run(&points, delta);
        prop_assert_eq!(out.len(), points.len());
        prop_assert_eq!(out[0], points[0]);
        prop_assert_eq!(out[out.len() - 1], points[points.len() - 1]);
        for (before, after) in points.iter().zip(&out) {
            prop_assert_eq!(before.at, after.at);
            prop_assert!((POSITION_MIN..=POSITION_MAX).contains(&after.pos));
        }
    }
}
