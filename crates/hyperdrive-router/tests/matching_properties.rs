//! Property tests for route matching.

use http::Method;
use hyperdrive_router::{Route, Router};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._~-]{1,12}"
}

proptest! {
    /// Every placeholder captures exactly the literal value placed in it.
    #[test]
    fn prop_captures_equal_bound_values(
        literals in prop::collection::vec(segment(), 1..4),
        values in prop::collection::vec(value(), 1..4),
    ) {
        let count = literals.len().min(values.len());
        let mut template = String::new();
        let mut path = String::new();
        for i in 0..count {
            template.push_str(&format!("/{}/{{p{i}}}", literals[i]));
            path.push_str(&format!("/{}/{}", literals[i], values[i]));
        }

        let router = Router::from_routes(vec![
            Route::new(Method::GET, &template, "C", "a").unwrap(),
        ]);
        let found = router.match_route(&Method::GET, &path);
        prop_assert!(found.is_some());

        let found = found.unwrap();
        prop_assert_eq!(found.params.len(), count);
        for (i, expected) in values.iter().enumerate().take(count) {
            let name = format!("p{i}");
            prop_assert_eq!(found.params.get(&name), Some(expected.as_str()));
        }
    }

    /// Of two routes matching the same path, the earlier one always wins.
    #[test]
    fn prop_registration_order_decides(base in segment(), id in value()) {
        let router = Router::from_routes(vec![
            Route::new(Method::GET, &format!("/{base}/{{id}}"), "C", "first").unwrap(),
            Route::new(Method::GET, &format!("/{base}/{{slug}}"), "C", "second").unwrap(),
        ]);

        let found = router.match_route(&Method::GET, &format!("/{base}/{id}")).unwrap();
        prop_assert_eq!(found.route.action(), "first");
    }

    /// Matching is a pure function of the registered routes.
    #[test]
    fn prop_matching_is_idempotent(base in segment(), path in "/[a-z0-9/]{0,20}") {
        let router = Router::from_routes(vec![
            Route::new(Method::GET, &format!("/{base}/{{id}}"), "C", "show").unwrap(),
        ]);

        let first = router.match_route(&Method::GET, &path);
        let second = router.match_route(&Method::GET, &path);
        prop_assert_eq!(first, second);
    }

    /// A static route never matches a path with a different segment count.
    #[test]
    fn prop_extra_segments_never_match(base in segment(), extra in segment()) {
        let router = Router::from_routes(vec![
            Route::new(Method::GET, &format!("/{base}"), "C", "index").unwrap(),
        ]);

        let path = format!("/{base}/{extra}");
        prop_assert!(router.match_route(&Method::GET, &path).is_none());
    }
}
