use optbind_logger::{LevelFilter, Logger};

#[test]
fn console_only_logger_has_no_file_writer() {
    let logger = Logger::builder()
        .name("console-only")
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert_eq!(logger.name(), "console-only");
    assert!(!logger.has_file_output());
}
