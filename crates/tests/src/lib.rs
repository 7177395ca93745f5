//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - configuration file to dispatch tree to files on disk
//! - failure isolation and teardown across nested dispatchers
//! - async delivery through the configured logger

#[cfg(test)]
mod contract_tests {
    use contracts::{Formatter, LogContext, LogLevel, PatternFormatter, DEFAULT_PATTERN};

    #[test]
    fn test_default_pattern_compiles() {
        let formatter = PatternFormatter::new(DEFAULT_PATTERN).unwrap();
        let line = formatter.format("ready", LogLevel::Info, &LogContext::new("main.rs", 3));
        assert!(line.ends_with("[Inf] ready\n"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, LogContext, LogLevel, PatternFormatter, Sink};
    use dispatcher::{
        create_dispatcher, Dispatcher, DispatcherError, FormattedWriter, MemorySink, Receiver,
        SharedSink,
    };
    use logger::build_logger;

    struct Unwritable;

    impl Sink for Unwritable {
        fn name(&self) -> &str {
            "unwritable"
        }

        fn write_str(&mut self, _text: &str) -> Result<(), ContractError> {
            Err(ContractError::sink_write("unwritable", "device gone"))
        }
    }

    fn load(content: &str) -> contracts::LogConfig {
        ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap()
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    /// Config file -> tree -> three files with their own formats
    #[test]
    fn test_e2e_config_tree_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let root_log = dir.path().join("root.log");
        let nested_log = dir.path().join("nested/detail.log");
        let errors_log = dir.path().join("errors.log");

        let content = format!(
            r#"
format = "%Lev|%Msg%n"
mode = "sync"

[[receivers]]
type = "file"
path = "{root}"

[[receivers]]
type = "dispatcher"
format = "%Level %File:%Line %Msg%n"

[[receivers.receivers]]
type = "file"
path = "{nested}"

[[receivers]]
type = "filter"
levels = ["error", "critical"]

[[receivers.receivers]]
type = "file"
path = "{errors}"
"#,
            root = root_log.display(),
            nested = nested_log.display(),
            errors = errors_log.display(),
        );
        let config = load(&content);
        let mut root = create_dispatcher(&config).unwrap();

        let context = LogContext::new("src/app.rs", 42);
        let mut failures = Vec::new();
        for (level, message) in [
            (LogLevel::Info, "started"),
            (LogLevel::Error, "lost connection"),
            (LogLevel::Debug, "retrying"),
        ] {
            root.dispatch(message, level, &context, &mut |e| failures.push(e));
        }
        root.close().unwrap();

        assert!(failures.is_empty());
        assert_eq!(read(&root_log), "Inf|started\nErr|lost connection\nDbg|retrying\n");
        assert_eq!(
            read(&nested_log),
            "Info app.rs:42 started\nError app.rs:42 lost connection\nDebug app.rs:42 retrying\n"
        );
        // Filter without its own format inherits the root one
        assert_eq!(read(&errors_log), "Err|lost connection\n");
    }

    /// One broken destination never starves its siblings or nested dispatchers
    #[test]
    fn test_e2e_failure_isolation() {
        let before = MemorySink::new("before");
        let after = MemorySink::new("after");
        let nested = MemorySink::new("nested");
        let (h_before, h_after, h_nested) = (before.handle(), after.handle(), nested.handle());
        let formatter = PatternFormatter::new("%Msg").unwrap().shared();

        let child = Dispatcher::builder()
            .formatter(formatter.clone())
            .sink(nested)
            .build()
            .unwrap();
        let mut root = Dispatcher::builder()
            .formatter(formatter)
            .sink(before)
            .sink(Unwritable)
            .sink(after)
            .receiver(Receiver::node(child))
            .build()
            .unwrap();

        let mut failures = Vec::new();
        for i in 0..4 {
            root.dispatch(
                &format!("m{i}"),
                LogLevel::Warn,
                &LogContext::default(),
                &mut |e| failures.push(e),
            );
        }

        assert_eq!(h_before.lines(), vec!["m0", "m1", "m2", "m3"]);
        assert_eq!(h_after.lines(), h_before.lines());
        assert_eq!(h_nested.lines(), h_before.lines());
        assert_eq!(failures.len(), 4);
        assert!(failures
            .iter()
            .all(|e| matches!(e, DispatcherError::Write { sink_name, .. } if sink_name == "unwritable")));
    }

    /// Shared sinks are flushed by the tree but stay open for their other owner
    #[test]
    fn test_e2e_shared_sink_survives_close() {
        let memory = MemorySink::new("shared");
        let handle = memory.handle();
        let shared: SharedSink = Arc::new(Mutex::new(Box::new(memory) as Box<dyn Sink>));
        let formatter = PatternFormatter::new("%Msg").unwrap().shared();

        let writer = FormattedWriter::shared(Arc::clone(&shared), formatter.clone()).unwrap();
        let mut root = Dispatcher::new(Some(formatter), vec![Receiver::Writer(writer)]).unwrap();
        root.dispatch("in tree", LogLevel::Info, &LogContext::default(), &mut |_| {});
        root.close().unwrap();

        assert_eq!(handle.close_count(), 0);
        assert!(handle.flush_count() >= 1);
        shared.lock().unwrap().write_str("after tree").unwrap();
        assert_eq!(handle.lines(), vec!["in tree", "after tree"]);
    }

    /// After close, nothing reaches a sink and the caller learns why
    #[test]
    fn test_e2e_closed_tree_rejects_events() {
        let memory = MemorySink::new("mem");
        let handle = memory.handle();
        let mut root = Dispatcher::builder()
            .formatter(PatternFormatter::new("%Msg").unwrap().shared())
            .sink(memory)
            .build()
            .unwrap();

        root.close().unwrap();
        let mut failures = Vec::new();
        root.dispatch("late", LogLevel::Info, &LogContext::default(), &mut |e| {
            failures.push(e)
        });

        assert!(handle.lines().is_empty());
        assert!(matches!(failures.as_slice(), [DispatcherError::Closed]));
        assert!(matches!(root.close(), Err(DispatcherError::Closed)));
    }

    #[test]
    fn test_e2e_unsupported_receiver_rejected() {
        let result = Dispatcher::new(
            Some(PatternFormatter::new("%Msg").unwrap().shared()),
            vec![Receiver::opaque(String::from("not a receiver"))],
        );
        match result {
            Err(DispatcherError::UnsupportedReceiverType { type_name }) => {
                assert!(type_name.contains("String"));
            }
            other => panic!("expected unsupported receiver, got {other:?}"),
        }
    }

    /// Async logger built from config drains its queue before closing files
    #[tokio::test]
    async fn test_e2e_async_logger_drains_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("async.log");
        let content = format!(
            r#"
format = "%Msg%n"
mode = "async_loop"
queue_capacity = 1000
min_level = "info"

[[receivers]]
type = "file"
path = "{}"
buffered = true
"#,
            path.display()
        );
        let logger = build_logger(&load(&content)).unwrap();

        for i in 0..300 {
            logger.log(LogLevel::Info, &format!("line {i}"));
            logger.log(LogLevel::Debug, "filtered");
        }
        logger.shutdown().await.unwrap();

        let written = read(&path);
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 300);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[299], "line 299");
    }

    #[test]
    fn test_e2e_invalid_configs_rejected() {
        let empty = ConfigLoader::load_from_str("mode = \"sync\"", ConfigFormat::Toml);
        assert!(empty.is_err());

        let unknown = ConfigLoader::load_from_str(
            "[[receivers]]\ntype = \"smoke_signal\"\n",
            ConfigFormat::Toml,
        );
        assert!(matches!(unknown, Err(ContractError::ConfigParse { .. })));
    }
}
