//! Integration tests for relation discovery across the public API.

use std::sync::Arc;

use statquest::discovery::{PairKey, SkipReason, SkippedTest};
use statquest::formatters::{JsonFormatter, RelationFormatter};
use statquest::prelude::*;
use statquest::relation::RelationRecord;

fn observable<K, V>(name: &str, data: impl IntoIterator<Item = (K, V)>) -> Arc<Observable>
where
    K: Into<Key>,
    V: Into<Value>,
{
    Arc::new(Observable::new(name, data).unwrap())
}

/// Ordinal A, continuous B and nominal C over the same five rows.
fn scenario() -> Vec<Arc<Observable>> {
    vec![
        observable("A", [(1, 1), (2, 3), (3, 1), (4, 2), (5, 6)]),
        observable("B", [(1, 1.0), (2, 3.2), (3, 1.1), (4, 2.1), (5, 6.1)]),
        observable("C", [(1, "red"), (2, "blue"), (3, "x"), (4, "y"), (5, "z")]),
    ]
}

fn tests_of(relations: &[Relation]) -> Vec<StatisticalTest> {
    relations.iter().map(Relation::test).collect()
}

fn engine() -> DiscoveryEngine {
    DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default())
}

#[test]
fn test_end_to_end_scenario() {
    let pool = scenario();
    assert!(pool[0].is_ordinal() && pool[0].is_continuous());
    assert!(pool[1].is_continuous() && !pool[1].is_ordinal());
    assert!(pool[2].is_nominal());

    let discovery = engine().discover(&pool).unwrap();
    assert!(discovery.skipped.is_empty());
    assert_eq!(discovery.relations.len(), 3);

    assert_eq!(
        tests_of(discovery.relations.get("A", "B").unwrap()),
        vec![
            StatisticalTest::KruskalWallis,
            StatisticalTest::Pearson,
            StatisticalTest::Spearman,
            StatisticalTest::Kendall,
        ]
    );
    assert_eq!(
        tests_of(discovery.relations.get("A", "C").unwrap()),
        vec![StatisticalTest::ChiSquare, StatisticalTest::KruskalWallis]
    );
    assert_eq!(
        tests_of(discovery.relations.get("B", "C").unwrap()),
        vec![StatisticalTest::KruskalWallis]
    );

    // every relation is stored in name order
    for (pair, relations) in &discovery.relations {
        assert!(pair.is_canonical());
        for relation in relations {
            assert_eq!(relation.a().name(), pair.a);
            assert_eq!(relation.b().name(), pair.b);
            assert!((0.0..=1.0).contains(&relation.p_value()));
        }
    }
}

#[test]
fn test_single_pearson_per_pair_regardless_of_input_order() {
    let a = observable("A", [(1, 1.0), (2, 2.5), (3, 2.0), (4, 4.5)]);
    let b = observable("B", [(1, 0.5), (2, 2.0), (3, 2.5), (4, 3.5)]);

    for pool in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
        let discovery = engine().discover(&pool).unwrap();
        let pearson: Vec<_> = discovery
            .relations
            .relations()
            .filter(|r| r.test() == StatisticalTest::Pearson)
            .collect();
        assert_eq!(pearson.len(), 1);
        assert_eq!(pearson[0].a().name(), "A");
        assert_eq!(discovery.relations.len(), 1);
    }
}

#[test]
fn test_kruskal_wallis_is_order_independent() {
    let nominal = observable("N", (1..=6).zip(["a", "a", "b", "b", "c", "c"]));
    let continuous = observable("C", (1..=6).zip([1.5, 2.5, 3.0, 7.5, 9.0, 8.5]));

    let forward = StatisticalTest::KruskalWallis.apply(&nominal, &continuous).unwrap();
    let backward = StatisticalTest::KruskalWallis.apply(&continuous, &nominal).unwrap();
    assert_eq!(forward.statistic(), backward.statistic());
    assert_eq!(forward.p_value(), backward.p_value());
}

#[test]
fn test_insufficient_overlap_yields_no_relation() {
    let a = observable("a", [(1, 1.0), (2, 2.0), (3, 3.0)]);
    let b = observable("b", [(3, 5.0), (4, 6.0), (5, 7.0)]);

    let discovery = engine().discover(&[a, b]).unwrap();
    assert!(discovery.relations.is_empty());
    assert_eq!(
        discovery.skipped,
        vec![SkippedTest {
            pair: PairKey::new("a", "b"),
            test: None,
            reason: SkipReason::InsufficientOverlap { shared: 1 },
        }]
    );
}

#[test]
fn test_credibility_filter() {
    let discovery = engine().discover(&scenario()).unwrap();
    let alpha = Alpha::new(0.05).unwrap();
    let credible = discovery.credible_only(alpha);

    assert!(credible.relation_count() <= discovery.relations.relation_count());
    for relation in credible.relations() {
        assert!(relation.credible(alpha));
    }
    // A and B move together closely
    let ab = tests_of(credible.get("A", "B").unwrap());
    assert!(ab.contains(&StatisticalTest::Pearson));

    // at alpha 0 no p-value is small or large enough
    assert!(discovery.credible_only(Alpha::new(0.0).unwrap()).is_empty());
}

#[test]
fn test_empty_pool_is_an_error() {
    assert!(matches!(
        engine().discover(&[]),
        Err(QuestError::NoObservables)
    ));
}

#[test]
fn test_unclassifiable_input_is_rejected() {
    assert!(Observable::new("empty", Vec::<(i64, i64)>::new()).is_err());
    assert!(Observable::new("nan", [(1, 1.0), (2, f64::NAN)]).is_err());
}

#[test]
fn test_relations_serialize_as_records() {
    let discovery = engine().discover(&scenario()).unwrap();
    let alpha = Alpha::new(0.05).unwrap();
    let json = JsonFormatter::new()
        .format(&discovery.relations, alpha)
        .unwrap();
    let records: Vec<RelationRecord> = serde_json::from_str(&json).unwrap();

    assert_eq!(records.len(), discovery.relations.relation_count());
    assert_eq!(records[0].a, "A");
    assert_eq!(records[0].test, StatisticalTest::KruskalWallis);
}

#[test]
fn test_restricted_suite() {
    let suite = TestSuite::from_ids(&["pearson", "chi-square"]).unwrap();
    let discovery = DiscoveryEngine::new(suite, DiscoveryConfig::default())
        .discover(&scenario())
        .unwrap();

    assert_eq!(
        tests_of(discovery.relations.get("A", "B").unwrap()),
        vec![StatisticalTest::Pearson]
    );
    assert_eq!(
        tests_of(discovery.relations.get("A", "C").unwrap()),
        vec![StatisticalTest::ChiSquare]
    );
    assert!(discovery.relations.get("B", "C").is_none());
}
