//! Property-based tests for classification, the statistical tests and
//! discovery.
//!
//! Each property generates random columns and checks an invariant that must
//! hold for every input:
//! - classification is deterministic and nominal excludes the other scales
//! - p-values are probabilities
//! - symmetric tests ignore operand order, and Kruskal-Wallis normalizes it
//! - discovery never reports a symmetric test twice for one pair
//! - credibility filtering only ever removes relations

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use statquest::observable::classify;
use statquest::prelude::*;

fn value_strategy() -> impl Strategy<Value = statquest::observable::Value> {
    prop_oneof![
        (-50i64..50).prop_map(Value::Int),
        (-50.0f64..50.0).prop_map(Value::Float),
        "[a-c]{1,2}".prop_map(Value::Text),
        (-50i64..50).prop_map(|i| Value::Text(i.to_string())),
    ]
}

fn column(name: &str, values: &[f64]) -> Arc<Observable> {
    Arc::new(Observable::new(name, values.iter().copied().enumerate()).unwrap())
}

fn labels(name: &str, values: &[u8]) -> Arc<Observable> {
    Arc::new(
        Observable::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (i, format!("g{v}"))),
        )
        .unwrap(),
    )
}

proptest! {
    #[test]
    fn prop_classification_is_deterministic(values in prop::collection::vec(value_strategy(), 1..40)) {
        let first = classify(&values).unwrap();
        let second = classify(&values).unwrap();
        prop_assert_eq!(first, second);

        if first.is_ordinal || first.is_continuous {
            prop_assert!(!first.is_nominal);
        } else {
            prop_assert!(first.is_nominal);
        }
        // every integer is also a real number
        if first.is_ordinal {
            prop_assert!(first.is_continuous);
        }
    }

    #[test]
    fn prop_p_values_are_probabilities(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..40)
    ) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let a = column("a", &xs);
        let b = column("b", &ys);
        for test in [StatisticalTest::Pearson, StatisticalTest::Spearman, StatisticalTest::Kendall] {
            if let Ok(relation) = test.apply(&a, &b) {
                prop_assert!((0.0..=1.0).contains(&relation.p_value()), "{}", relation);
                prop_assert!(relation.statistic().abs() <= 1.0 + 1e-12, "{}", relation);
            }
        }
    }

    #[test]
    fn prop_symmetric_tests_ignore_operand_order(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..30)
    ) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let a = column("a", &xs);
        let b = column("b", &ys);
        for test in [StatisticalTest::Pearson, StatisticalTest::Spearman, StatisticalTest::Kendall] {
            prop_assert!(test.is_symmetric());
            match (test.apply(&a, &b), test.apply(&b, &a)) {
                (Ok(ab), Ok(ba)) => {
                    prop_assert!((ab.statistic() - ba.statistic()).abs() < 1e-9);
                    prop_assert!((ab.p_value() - ba.p_value()).abs() < 1e-9);
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "{} succeeded in one orientation only", test),
            }
        }
    }

    #[test]
    fn prop_kruskal_wallis_normalizes_operands(
        rows in prop::collection::vec((0u8..4, -100.0f64..100.0), 4..40)
    ) {
        let (groups, values): (Vec<u8>, Vec<f64>) = rows.into_iter().unzip();
        let g = labels("g", &groups);
        let v = column("v", &values);
        let forward = StatisticalTest::KruskalWallis.apply(&g, &v);
        let backward = StatisticalTest::KruskalWallis.apply(&v, &g);
        match (forward, backward) {
            (Ok(f), Ok(b)) => {
                prop_assert_eq!(f.statistic(), b.statistic());
                prop_assert_eq!(f.p_value(), b.p_value());
                prop_assert!((0.0..=1.0).contains(&f.p_value()));
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "orientation changed the outcome"),
        }
    }

    #[test]
    fn prop_kruskal_wallis_normalizes_ordinal_pairs(
        rows in prop::collection::vec((0i64..3, 0i64..3), 4..30)
    ) {
        let a = Arc::new(Observable::new("a", rows.iter().enumerate().map(|(i, r)| (i, r.0))).unwrap());
        let b = Arc::new(Observable::new("b", rows.iter().enumerate().map(|(i, r)| (i, r.1))).unwrap());
        let forward = StatisticalTest::KruskalWallis.apply(&a, &b);
        let backward = StatisticalTest::KruskalWallis.apply(&b, &a);
        match (forward, backward) {
            (Ok(f), Ok(b)) => {
                prop_assert_eq!(f.statistic(), b.statistic());
                prop_assert_eq!(f.p_value(), b.p_value());
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "orientation changed the outcome"),
        }
    }

    #[test]
    fn prop_discovery_has_no_duplicate_symmetric_relations(
        columns in prop::collection::vec(prop::collection::vec(0i64..6, 8), 2..6)
    ) {
        let pool: Vec<Arc<Observable>> = columns
            .iter()
            .enumerate()
            .map(|(i, values)| {
                Arc::new(Observable::new(format!("c{i}"), values.iter().copied().enumerate()).unwrap())
            })
            .collect();

        let discovery = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default())
            .discover(&pool)
            .unwrap();

        let mut seen = HashSet::new();
        for (pair, relations) in &discovery.relations {
            prop_assert!(pair.a < pair.b);
            prop_assert!(!relations.is_empty());
            for relation in relations {
                if relation.test().is_symmetric() {
                    prop_assert!(seen.insert((pair.a.clone(), pair.b.clone(), relation.test())));
                }
            }
        }
    }

    #[test]
    fn prop_credible_only_is_a_subset(
        pairs in prop::collection::vec((0i64..5, -10.0f64..10.0), 6..30),
        alpha in 0.0f64..=1.0
    ) {
        let (xs, ys): (Vec<i64>, Vec<f64>) = pairs.into_iter().unzip();
        let pool = vec![
            Arc::new(Observable::new("x", xs.into_iter().enumerate()).unwrap()),
            column("y", &ys),
        ];
        let discovery = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default())
            .discover(&pool)
            .unwrap();

        let alpha = Alpha::new(alpha).unwrap();
        let credible = discovery.credible_only(alpha);
        prop_assert!(credible.relation_count() <= discovery.relations.relation_count());
        for relation in credible.relations() {
            prop_assert!(relation.credible(alpha));
        }
        let kept = discovery.relations.relations().filter(|r| r.credible(alpha)).count();
        prop_assert_eq!(kept, credible.relation_count());
    }
}

#[test]
fn test_alpha_rejects_out_of_range() {
    for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
        assert!(Alpha::new(bad).is_err());
    }
    assert!(Alpha::new(0.0).is_ok());
    assert!(Alpha::new(1.0).is_ok());
}
