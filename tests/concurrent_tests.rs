mod common;

use common::*;
use strata::{
    ConcurrencyConfig, EvaluationConfig, NodeCursor, NodeKey, Query, QueryError, WorkerLimiter,
};
use strata_cursor::tests::{
    FaultyCursor, TrackedCursor, create_test_document, create_wide_document,
};
use strata_xpath::testing::assert_axis_conventions;
use strata_xpath::{AxisError, Expression};

fn configurations() -> Vec<(&'static str, ConcurrencyConfig)> {
    vec![
        ("sequences", ConcurrencyConfig::enabled().with_buffer_size(1)),
        (
            "steps",
            ConcurrencyConfig::enabled()
                .with_buffer_size(2)
                .with_parallel_sequences(false)
                .with_parallel_steps(true),
        ),
        (
            "sequences and steps",
            ConcurrencyConfig::enabled()
                .with_buffer_size(64)
                .with_parallel_steps(true),
        ),
        ("single worker", ConcurrencyConfig::enabled().with_max_workers(1)),
        ("inline only", ConcurrencyConfig::enabled().with_max_workers(0)),
    ]
}

fn run(query: &Query, start: u64) -> Result<Vec<u64>, QueryError> {
    let snapshot = create_test_document();
    let mut cursor = snapshot.cursor();
    Ok(query
        .collect_keys(&mut cursor, NodeKey::new(start))?
        .into_iter()
        .map(NodeKey::get)
        .collect())
}

#[test]
fn test_concurrent_evaluation_matches_sequential() {
    init_logger();
    for (label, config) in configurations() {
        for scenario in scenarios() {
            let query = Query::builder()
                .with_expression(scenario.expression)
                .with_concurrency(config.clone())
                .build()
                .unwrap();
            assert_eq!(
                run(&query, scenario.start).unwrap(),
                scenario.expected,
                "{} with {}",
                scenario.query,
                label
            );
        }
    }
}

#[test]
fn test_concurrent_queries_follow_axis_conventions() {
    init_logger();
    let snapshot = create_test_document();
    let mut cursor = snapshot.cursor();
    for (label, config) in configurations() {
        for scenario in scenarios() {
            let query = Query::builder()
                .with_expression(scenario.expression)
                .with_concurrency(config.clone())
                .build()
                .unwrap();
            let mut axis = query
                .compile(&cursor)
                .unwrap_or_else(|e| panic!("{} with {}: {}", scenario.query, label, e));
            assert!(cursor.move_to(NodeKey::new(scenario.start)));
            println!("checking {} from {} with {}", scenario.query, scenario.start, label);
            assert_axis_conventions(&mut axis, &mut cursor, &scenario.expected);
        }
    }
}

#[test]
fn test_query_can_be_rerun() {
    init_logger();
    let query = Query::builder()
        .with_expression(Expression::sequence(vec![
            rel(vec![child(name("b"))]),
            abs(vec![slash_slash(), child(name("c"))]),
        ]))
        .with_concurrency(ConcurrencyConfig::enabled().with_buffer_size(1))
        .build()
        .unwrap();
    for _ in 0..3 {
        assert_eq!(run(&query, 1).unwrap(), vec![5, 9, 7, 11]);
    }
}

#[test]
fn test_producer_failure_reaches_consumer() {
    init_logger();
    let snapshot = create_test_document();
    let mut cursor = FaultyCursor::new(snapshot, NodeKey::new(9));
    let query = Query::builder()
        .with_expression(Expression::sequence(vec![
            rel(vec![child(name("b"))]),
            rel(vec![child(name("b"))]),
        ]))
        .with_concurrency(ConcurrencyConfig::enabled().with_buffer_size(1))
        .build()
        .unwrap();

    let results: Vec<_> = query
        .evaluate_from(&mut cursor, NodeKey::new(1))
        .unwrap()
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap(), &NodeKey::new(5));
    assert!(matches!(
        &results[1],
        Err(QueryError::Axis(AxisError::CursorIntegrity { key, .. })) if *key == NodeKey::new(9)
    ));
}

#[test]
fn test_abandoned_evaluation_releases_workers() {
    init_logger();
    let snapshot = create_wide_document(1000);
    let mut cursor = TrackedCursor::new(snapshot);
    let items = || rel(vec![child(name("root")), child(name("item")), child(text())]);
    let limiter = WorkerLimiter::new(4);
    let query = Query::builder()
        .with_expression(Expression::sequence(vec![items(), items(), items()]))
        .with_concurrency(ConcurrencyConfig::enabled().with_buffer_size(2))
        .with_worker_limiter(limiter.clone())
        .build()
        .unwrap();

    {
        let mut evaluation = query.evaluate_from(&mut cursor, NodeKey::DOCUMENT_ROOT).unwrap();
        assert!(evaluation.next().unwrap().is_ok());
        assert!(evaluation.next().unwrap().is_ok());
    }

    assert_eq!(cursor.live_instances(), 1);
    assert_eq!(limiter.available(), 4);
}

#[test]
fn test_shared_limiter_across_queries() {
    init_logger();
    let limiter = WorkerLimiter::new(1);
    let build = |expression: Expression| {
        Query::builder()
            .with_expression(expression)
            .with_concurrency(ConcurrencyConfig::enabled())
            .with_worker_limiter(limiter.clone())
            .build()
            .unwrap()
    };
    let first = build(Expression::sequence(vec![
        rel(vec![child(name("b"))]),
        rel(vec![child(text())]),
    ]));
    let second = build(Expression::sequence(vec![
        abs(vec![slash_slash(), child(name("c"))]),
        Expression::ContextItem,
    ]));

    let snapshot = create_test_document();
    let mut cursor = snapshot.cursor();
    let mut one = first.evaluate_from(&mut cursor, NodeKey::new(1)).unwrap();
    assert_eq!(one.next().unwrap().unwrap(), NodeKey::new(5));
    let rest: Vec<_> = one.map(|key| key.unwrap().get()).collect();
    assert_eq!(rest, vec![9, 4, 8, 13]);

    assert_eq!(run(&second, 1).unwrap(), vec![7, 11, 1]);
    assert_eq!(limiter.available(), 1);
}

#[test]
fn test_configuration_from_json() {
    init_logger();
    let config = EvaluationConfig::from_json(
        r#"{
            "namespaces": { "p": "ns" },
            "concurrency": { "enabled": true, "bufferSize": 1, "maxWorkers": 2, "parallelSteps": true }
        }"#,
    )
    .unwrap();
    let query = Query::builder()
        .with_config(config)
        .with_expression(Expression::sequence(vec![
            abs(vec![child(p("a")), child(name("b")), child(name("c"))]),
            rel(vec![child(p("a")), child(text())]),
        ]))
        .build()
        .unwrap();
    assert_eq!(run(&query, 0).unwrap(), vec![7, 11, 4, 8, 13]);
}
