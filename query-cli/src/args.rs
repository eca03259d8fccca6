use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use graph_middleware::{ConnectionConfig, GraphMiddlewareError, Query, Value};
use tracing::Level;

pub(crate) const DEFAULT_QUERY: &str = "MATCH (u:User {state: $state} )-[:WATCHED]->(m)-[:HAS]->(g:Genre)

RETURN g.name as genre, count(g) as freq
ORDER BY freq DESC";

pub(crate) const DEFAULT_STATE: &str = "Texas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line per record with the value of `--field`
    Lines,
    /// One JSON object per record
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a read-only Cypher query and print the results")]
pub(crate) struct Args {
    #[arg(long, env = "NEO4J_URI")]
    pub(crate) uri: String,
    #[arg(long, env = "NEO4J_USERNAME")]
    pub(crate) user: String,
    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true, default_value = "")]
    pub(crate) password: String,
    #[arg(long, env = "NEO4J_DATABASE", default_value = "neo4j")]
    pub(crate) database: String,
    /// Cypher text; defaults to the genre-frequency query
    #[arg(long, conflicts_with = "query_file")]
    pub(crate) query: Option<String>,
    #[arg(long)]
    pub(crate) query_file: Option<PathBuf>,
    /// Query parameter, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub(crate) params: Vec<(String, Value)>,
    /// Field printed for each record in `lines` format
    #[arg(long, default_value = "genre")]
    pub(crate) field: String,
    #[arg(long, value_enum, default_value = "lines")]
    pub(crate) format: OutputFormat,
    #[arg(long)]
    pub(crate) fetch_size: Option<usize>,
    /// Also append logs to this file
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

impl Args {
    pub(crate) fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    pub(crate) fn connection_config(&self) -> Result<ConnectionConfig, GraphMiddlewareError> {
        let mut builder = ConnectionConfig::builder()
            .uri(&self.uri)
            .credentials(&self.user, &self.password)
            .database(&self.database);
        if let Some(fetch_size) = self.fetch_size {
            builder = builder.fetch_size(fetch_size);
        }
        builder.build()
    }

    /// The query to run; the built-in query gets `state=Texas` unless parameters were given.
    pub(crate) fn query(&self) -> std::io::Result<Query> {
        let text = match (&self.query, &self.query_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                let params = if self.params.is_empty() {
                    vec![("state".to_string(), Value::from(DEFAULT_STATE))]
                } else {
                    self.params.clone()
                };
                return Ok(Query::new(DEFAULT_QUERY).params_from(params));
            }
        };
        Ok(Query::new(text).params_from(self.params.clone()))
    }
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in `{raw}`"));
    }
    Ok((key.to_string(), parse_literal(value)))
}

/// `null`, booleans, integers and floats are typed; anything else is a string.
/// Surrounding double quotes force a string.
pub(crate) fn parse_literal(raw: &str) -> Value {
    if let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::from(inner);
    }
    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Int(int);
    }
    if raw.bytes().any(|b| b.is_ascii_digit())
        && let Ok(float) = raw.parse::<f64>()
    {
        return Value::Float(float);
    }
    Value::from(raw)
}
