use graph_middleware::memory::{Fixture, MemoryGraph};
use graph_middleware::prelude::*;
use tokio::runtime::Runtime;

const TITLES: &str = "MATCH (m:Movie) WHERE m.released > $year \
                      RETURN m.title AS title, m.rating AS rating, m.sequel AS sequel";

fn graph() -> MemoryGraph {
    MemoryGraph::new().with_database("films").with_fixture(
        Fixture::new(TITLES)
            .param("year", 1999)
            .columns(["title", "rating", "sequel"])
            .row([Value::from("Arrival"), Value::Float(7.9), Value::Null])
            .row([Value::from("Dune"), Value::Float(8.0), Value::Bool(true)]),
    )
}

fn config() -> ConnectionConfig {
    ConnectionConfig::builder()
        .uri("bolt://localhost:7687")
        .credentials("neo4j", "pw")
        .database("films")
        .fetch_size(100)
        .build()
        .unwrap()
}

#[tokio::test]
async fn runner_keeps_one_connection_across_calls() {
    let graph = graph();
    let runner = QueryRunner::connect(&graph, &config()).await.unwrap();
    assert_eq!(runner.database(), "films");
    assert_eq!(graph.open_connections(), 1);

    let query = Query::new(TITLES).param("year", 1999);
    for _ in 0..3 {
        let result = runner.run(&query).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(graph.open_transactions(), 0);
    }
    assert_eq!(graph.statements_executed(), 3);
    assert_eq!(graph.open_connections(), 1);

    runner.close().await.unwrap();
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn dropping_the_runner_releases_the_connection() {
    let graph = graph();
    {
        let runner = QueryRunner::connect(&graph, &config()).await.unwrap();
        runner.verify_connectivity().await.unwrap();
        assert_eq!(graph.open_connections(), 1);
    }
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn typed_values_come_back_tagged() {
    let graph = graph();
    let runner = QueryRunner::connect(&graph, &config()).await.unwrap();
    let result = runner
        .run(&Query::new(TITLES).param("year", 1999))
        .await
        .unwrap();

    let arrival = &result[0];
    assert_eq!(arrival.value("rating").unwrap().as_float().unwrap(), 7.9);
    assert!(arrival.value("sequel").unwrap().is_null());
    assert!(matches!(
        arrival.get_string("rating"),
        Err(GraphMiddlewareError::TypeMismatchError {
            expected: "string",
            found: "float"
        })
    ));
    assert!(result[1].value("sequel").unwrap().as_bool().unwrap());
    runner.close().await.unwrap();
}

#[tokio::test]
async fn tearing_down_the_connection_fails_later_calls() {
    let graph = graph();
    let runner = QueryRunner::connect(&graph, &config()).await.unwrap();
    let query = Query::new(TITLES).param("year", 1999);

    graph.shutdown();
    let err = runner.run(&query).await.unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert!(runner.verify_connectivity().await.unwrap_err().is_connection_error());
    assert_eq!(graph.open_transactions(), 0);

    graph.set_reachable(true);
    assert_eq!(runner.run(&query).await.unwrap().len(), 2);
    runner.close().await.unwrap();
}

#[test]
fn runner_can_be_driven_from_a_runtime() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let graph = graph();
        let runner = QueryRunner::connect(&graph, &config()).await.unwrap();
        let err = runner
            .run(&Query::new(TITLES).param("year", 1999).param("genre", "SciFi"))
            .await
            .unwrap_err();
        assert!(err.is_query_error());
        assert_eq!(graph.statements_executed(), 0);
        runner.close().await.unwrap();
    });
}
