use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber.
///
/// Events go to stderr, since stdout carries query results only, and are
/// appended without colors to `log_file` when one is given.
pub(crate) fn init(level: Level, log_file: Option<&Path>) -> io::Result<()> {
    let file_layer = log_file.map(open_log).transpose()?.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn log_file_is_appended_to() {
        let path = std::env::temp_dir().join(format!("graph-query-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        writeln!(open_log(&path).unwrap(), "first run").unwrap();
        writeln!(open_log(&path).unwrap(), "second run").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first run\nsecond run\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let path = std::env::temp_dir().join("graph-query-no-such-dir").join("query.log");
        assert!(open_log(&path).is_err());
    }
}
