use std::collections::HashMap;
use std::time::Duration;

use chrono_tz::Tz;
use secrecy::ExposeSecret;

use super::*;

#[test]
fn defaults_from_empty_file() {
    let config = PluginConfig::from_toml("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.shutdown_timeout_seconds, 30);
    assert!(config.server.site_url.is_none());
    assert!(config.pagerduty.api_token.expose_secret().is_empty());
    assert!(config.pagerduty.api_base_url.is_empty());
    assert_eq!(config.pagerduty.timeout_seconds, 30);
    assert_eq!(config.auth.user_header, "Mattermost-User-ID");
    assert_eq!(config.display.time_zone, "UTC");
    assert_eq!(config.schedule.default_window_hours, 168);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl(), Some(Duration::from_secs(300)));
}

#[test]
fn full_file() {
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 9000
        site_url = "https://chat.example.com"

        [pagerduty]
        api_token = "u+abc"
        api_base_url = "https://pd.internal"
        timeout_seconds = 10

        [auth]
        user_header = "X-User-Id"

        [display]
        time_zone = "Europe/Berlin"

        [schedule]
        default_window_hours = 24

        [cache]
        enabled = false
        ttl_seconds = 0
    "#;

    let config = PluginConfig::from_toml(toml).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.site_url.as_deref(), Some("https://chat.example.com"));
    assert_eq!(config.pagerduty.api_token.expose_secret(), "u+abc");
    assert_eq!(config.pagerduty.api_base_url, "https://pd.internal");
    assert_eq!(config.auth.user_header, "X-User-Id");
    assert_eq!(config.display.tz(), Tz::Europe__Berlin);
    assert_eq!(config.schedule.default_window(), chrono::TimeDelta::hours(24));
    assert!(!config.cache.enabled);
    assert!(config.cache.ttl().is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn malformed_file_is_a_config_error() {
    let err = PluginConfig::from_toml("[server]\nport = \"high\"").unwrap_err();
    assert!(matches!(err, ServerError::Config(_)));
}

#[test]
fn empty_token_fails_validation() {
    let config = PluginConfig::default();
    assert!(matches!(config.validate(), Err(ServerError::Config(_))));

    let mut config = PluginConfig::default();
    config.pagerduty.set_api_token("   ".into());
    assert!(config.validate().is_err());
}

#[test]
fn env_token_overrides_file() {
    let mut config = PluginConfig::from_toml("[pagerduty]\napi_token = \"from-file\"").unwrap();
    let env: HashMap<&str, &str> = [(API_TOKEN_ENV, "from-env")].into();
    config.apply_env(|key| env.get(key).map(|v| (*v).to_owned()));
    assert_eq!(config.pagerduty.api_token.expose_secret(), "from-env");

    let mut config = PluginConfig::from_toml("[pagerduty]\napi_token = \"from-file\"").unwrap();
    config.apply_env(|_| Some(String::new()));
    assert_eq!(config.pagerduty.api_token.expose_secret(), "from-file");
}

#[test]
fn unknown_time_zone_falls_back_to_utc() {
    let display = DisplayConfig {
        time_zone: "Mars/Olympus_Mons".into(),
    };
    assert_eq!(display.tz(), Tz::UTC);
}

#[test]
fn debug_output_redacts_token() {
    let config = PluginConfig::from_toml("[pagerduty]\napi_token = \"very-secret\"").unwrap();
    assert!(!format!("{config:?}").contains("very-secret"));
}

fn temp_config_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pagerbridge-{name}-{}.toml", std::process::id()))
}

#[tokio::test]
async fn reload_installs_new_snapshot() {
    let path = temp_config_path("reload");
    std::fs::write(&path, "[server]\nport = 1111\n").unwrap();

    let store = ConfigStore::from_file(&path, PluginConfig::load(&path).unwrap());
    let before = store.snapshot().await;
    assert_eq!(before.server.port, 1111);

    std::fs::write(&path, "[server]\nport = 2222\n").unwrap();
    let reloaded = store.reload().await.unwrap();
    assert_eq!(reloaded.server.port, 2222);
    assert_eq!(store.snapshot().await.server.port, 2222);
    // Snapshots taken earlier are unaffected.
    assert_eq!(before.server.port, 1111);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn failed_reload_keeps_previous_snapshot() {
    let path = temp_config_path("bad-reload");
    std::fs::write(&path, "[server]\nport = 1111\n").unwrap();

    let store = ConfigStore::from_file(&path, PluginConfig::load(&path).unwrap());
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(store.reload().await.is_err());
    assert_eq!(store.snapshot().await.server.port, 1111);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn fixed_store_cannot_reload() {
    let store = ConfigStore::fixed(PluginConfig::default());
    assert!(store.path().is_none());
    assert!(store.reload().await.is_err());

    let mut next = PluginConfig::default();
    next.server.port = 4242;
    store.replace(next).await;
    assert_eq!(store.snapshot().await.server.port, 4242);
}
