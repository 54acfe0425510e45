use optbind::domain::config::{LogRotation, LoggingConfig};
use optbind_function::init_logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn logging_section_drives_file_output() -> Result<(), Box<dyn std::error::Error>> {
    let bad = LoggingConfig { level: "chatty".to_owned(), ..LoggingConfig::default() };
    let err = init_logger("fn-logging", &bad).expect_err("unknown level");
    assert!(err.to_string().contains("chatty"));

    let dir = tempdir()?;
    let cfg = LoggingConfig {
        level: "debug".to_owned(),
        json: true,
        directory: Some(dir.path().join("logs")),
        rotation: LogRotation::Never,
        max_files: 2,
    };

    let logger = init_logger("fn-logging", &cfg)?;
    assert!(logger.has_file_output());
    tracing::info!(trigger = "SampleHttpTrigger", "Request served");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let file = fs::read_dir(dir.path().join("logs"))?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");
    let contents = fs::read_to_string(file)?;
    assert!(contents.contains("\"trigger\":\"SampleHttpTrigger\""));
    Ok(())
}
