//! Integration tests for the logging module.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use roster_cli::logging::{
    LogConfig, LogFormat, REDACTED_VALUE, init_logging_with_writer, log_data_enabled,
    redact_value,
};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// The global subscriber can only be installed once per test binary.
#[test]
fn json_logging_redacts_student_data_by_default() {
    let captured = Captured::default();
    let writer = captured.clone();
    let mut config = LogConfig::default().with_format(LogFormat::Json);
    config.use_env_filter = false;
    init_logging_with_writer(&config, move || writer.clone());

    assert!(!log_data_enabled());
    tracing::warn!(full_name = redact_value("Ann Lee"), "update rejected");
    tracing::info!("below the warn threshold");

    let output = captured.contents();
    let line = output.lines().next().expect("one log line");
    let event: serde_json::Value = serde_json::from_str(line).expect("json log line");
    assert_eq!(event["level"], "WARN");
    assert_eq!(event["fields"]["message"], "update rejected");
    assert_eq!(event["fields"]["full_name"], REDACTED_VALUE);
    assert!(!output.contains("Ann Lee"));
    assert!(!output.contains("below the warn threshold"));
}
