//! A saved configuration yields a client for the configured table.

use roster_remote::{ConfigError, ConnectionConfig, RestClient};
use tempfile::tempdir;

#[test]
fn client_from_saved_config_targets_configured_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    ConnectionConfig::new("https://abcd.supabase.co/", "anon-key")
        .with_table("pupils")
        .with_operator("registrar")
        .save_to(&path)
        .unwrap();

    let config = ConnectionConfig::load_from(&path).unwrap();
    assert_eq!(config.operator, "registrar");
    let client = RestClient::new(&config).unwrap();
    assert_eq!(
        client.table_url().as_str(),
        "https://abcd.supabase.co/rest/v1/pupils"
    );
}

#[test]
fn hand_edited_invalid_url_is_rejected_before_any_request() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "url = \"http://abcd.supabase.co\"\nanon_key = \"k\"\n").unwrap();

    let config = ConnectionConfig::load_from(&path).unwrap();
    let err = RestClient::new(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl(_)));
    assert!(err.user_message().contains("supabase.co"));
}
