use graph_middleware::memory::{Fixture, MemoryGraph};
use graph_middleware::prelude::*;

const GENRE_QUERY: &str = "
MATCH (u:User {state: $state} )-[:WATCHED]->(m)-[:HAS]->(g:Genre)

RETURN g.name as genre, count(g) as freq
ORDER BY freq DESC
";

fn config() -> ConnectionConfig {
    ConnectionConfig::new("neo4j://localhost:7687", "reader", "secret", "neo4j").unwrap()
}

fn movies() -> MemoryGraph {
    MemoryGraph::new().with_user("reader", "secret").with_fixture(
        Fixture::new(GENRE_QUERY)
            .param("state", "Texas")
            .columns(["genre", "freq"])
            .row([Value::from("Drama"), Value::Int(3)])
            .row([Value::from("Comedy"), Value::Int(1)]),
    )
}

fn genre_query() -> Query {
    Query::new(GENRE_QUERY).param("state", "Texas")
}

#[tokio::test]
async fn genre_scenario_returns_ordered_records() {
    let graph = movies();
    let result = run_with(&graph, &config(), &genre_query()).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.column_names().unwrap().as_slice(),
        ["genre", "freq"]
    );
    assert_eq!(result[0].get_string("genre").unwrap(), "Drama");
    assert_eq!(result[0].value("freq").unwrap().as_int().unwrap(), 3);
    assert_eq!(result[1].get_string("genre").unwrap(), "Comedy");
    assert_eq!(result[1].value("freq").unwrap().as_int().unwrap(), 1);
    assert_eq!(result.column_strings("genre").unwrap(), ["Drama", "Comedy"]);
}

#[tokio::test]
async fn returns_exactly_n_records_in_database_order() {
    let text = "MATCH (m:Movie) RETURN m.title AS title ORDER BY m.released";
    let titles = ["Metropolis", "Casablanca", "Alien", "Heat", "Arrival"];
    let fixture = titles
        .iter()
        .fold(Fixture::new(text).columns(["title"]), |fixture, title| {
            fixture.row([*title])
        });
    let graph = MemoryGraph::new().with_fixture(fixture);

    let result = run_with(&graph, &config(), &Query::new(text)).await.unwrap();
    assert_eq!(result.len(), titles.len());
    assert_eq!(result.column_strings("title").unwrap(), titles);
}

#[tokio::test]
async fn unmatched_parameters_yield_empty_result() {
    let graph = movies();
    let query = Query::new(GENRE_QUERY).param("state", "Ohio");
    let result = run_with(&graph, &config(), &query).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(
        result.column_names().unwrap().as_slice(),
        ["genre", "freq"]
    );
}

#[tokio::test]
async fn missing_parameter_fails_before_any_round_trip() {
    let graph = movies();
    let err = run_with(&graph, &config(), &Query::new(GENRE_QUERY))
        .await
        .unwrap_err();

    assert!(err.is_query_error(), "{err}");
    assert!(err.to_string().contains("$state"));
    assert_eq!(graph.statements_executed(), 0);
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connection_error() {
    let graph = movies();
    graph.set_reachable(false);

    let err = run_with(&graph, &config(), &genre_query()).await.unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn rejected_credentials_are_a_connection_error() {
    let graph = movies();
    let bad = ConnectionConfig::new("neo4j://localhost:7687", "reader", "wrong", "neo4j").unwrap();

    let err = run_with(&graph, &bad, &genre_query()).await.unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert!(err.to_string().contains("reader"));
}

#[tokio::test]
async fn unknown_database_is_a_connection_error() {
    let graph = movies();
    let other =
        ConnectionConfig::new("neo4j://localhost:7687", "reader", "secret", "films").unwrap();

    let err = run_with(&graph, &other, &genre_query()).await.unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert_eq!(graph.open_connections(), 0);
    assert_eq!(graph.open_transactions(), 0);
}

#[tokio::test]
async fn database_runtime_error_is_a_query_error() {
    let text = "MATCH (x:NoSuchLabel) RETURN x.name AS name";
    let graph = MemoryGraph::new()
        .with_fixture(Fixture::new(text).fails_with("label NoSuchLabel does not exist"));

    let err = run_with(&graph, &config(), &Query::new(text)).await.unwrap_err();
    assert!(err.is_query_error(), "{err}");
    assert!(err.to_string().contains("NoSuchLabel"));
    assert_eq!(graph.open_transactions(), 0);
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn write_clause_never_reaches_the_database() {
    let graph = movies();
    let query =
        Query::new("MATCH (u:User {state: $state}) DETACH DELETE u").param("state", "Texas");

    let err = run_with(&graph, &config(), &query).await.unwrap_err();
    assert!(err.is_query_error(), "{err}");
    assert_eq!(graph.statements_executed(), 0);
}

#[tokio::test]
async fn writing_procedure_never_reaches_the_database() {
    let graph = movies();
    for text in ["CALL db.createLabel('X')", "CALL apoc.create.node(['User'], {})"] {
        let err = run_with(&graph, &config(), &Query::new(text))
            .await
            .unwrap_err();
        assert!(err.is_query_error(), "{text}: {err}");
    }
    assert_eq!(graph.statements_executed(), 0);
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn label_expressions_and_non_ascii_names_are_read_queries() {
    let text = "MATCH (m:Movie|Set {país: $país}) RETURN m.réseau AS network";
    let graph = MemoryGraph::new().with_fixture(
        Fixture::new(text)
            .param("país", "Chile")
            .columns(["network"])
            .row(["Canal 13"]),
    );

    let query = Query::new(text).param("país", "Chile");
    let result = run_with(&graph, &config(), &query).await.unwrap();
    assert_eq!(result.column_strings("network").unwrap(), ["Canal 13"]);
}

#[tokio::test]
async fn identical_calls_are_idempotent() {
    let graph = movies();
    let first = run_with(&graph, &config(), &genre_query()).await.unwrap();
    let second = run_with(&graph, &config(), &genre_query()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn resources_are_released_after_success_and_failure() {
    let graph = movies();

    run_with(&graph, &config(), &genre_query()).await.unwrap();
    assert_eq!(graph.open_connections(), 0);
    assert_eq!(graph.open_transactions(), 0);

    let failing = Query::new("MATCH (n) RETURN n.unknown AS unknown");
    assert!(run_with(&graph, &config(), &failing).await.is_err());
    assert_eq!(graph.open_connections(), 0);
    assert_eq!(graph.open_transactions(), 0);

    let again = run_with(&graph, &config(), &genre_query()).await.unwrap();
    assert_eq!(again.len(), 2);
}

#[tokio::test]
async fn connection_drop_mid_stream_returns_no_records() {
    let text = "MATCH (g:Genre) RETURN g.name AS genre";
    let graph = MemoryGraph::new().with_fixture(
        Fixture::new(text)
            .columns(["genre"])
            .row(["Drama"])
            .row(["Comedy"])
            .row(["Horror"])
            .disconnect_after(2),
    );

    let err = run_with(&graph, &config(), &Query::new(text)).await.unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert_eq!(graph.open_transactions(), 0);
    assert_eq!(graph.open_connections(), 0);
}

#[test]
fn blocking_run_matches_async_run() {
    let graph = movies();
    let result = run_blocking_with(&graph, &config(), &genre_query()).unwrap();
    assert_eq!(result.column_strings("genre").unwrap(), ["Drama", "Comedy"]);
    assert_eq!(graph.open_connections(), 0);
}

#[tokio::test]
async fn blocking_run_inside_a_runtime_is_refused() {
    let graph = movies();
    let err = run_blocking_with(&graph, &config(), &genre_query()).unwrap_err();
    assert!(err.is_connection_error(), "{err}");
    assert_eq!(graph.statements_executed(), 0);
    assert_eq!(graph.open_connections(), 0);
}
