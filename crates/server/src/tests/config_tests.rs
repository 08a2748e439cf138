use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_listen_on_local_port_3002_for_any_origin() {
    let settings = Settings::default();
    assert_eq!(settings.server_bind, "127.0.0.1:3002");
    assert!(settings.allowed_origins.is_empty());
    assert_eq!(settings.record_path, None);
    assert_eq!(settings.max_body_bytes, 16 * 1024);
}

#[test]
fn file_overrides_accept_strings_integers_and_arrays() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
bind_addr = "0.0.0.0:8080"
allowed_origins = ["https://example.com/", "http://localhost:3000"]
record_path = "./data/contact.jsonl"
max_body_bytes = 4096
"#,
    );

    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(
        settings.allowed_origins,
        vec!["https://example.com", "http://localhost:3000"]
    );
    assert_eq!(settings.record_path.as_deref(), Some("./data/contact.jsonl"));
    assert_eq!(settings.max_body_bytes, 4096);
}

#[test]
fn unreadable_file_leaves_defaults_untouched() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "bind_addr = ");
    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_apply_after_file_and_port_replaces_bind_port() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, r#"bind_addr = "0.0.0.0:8080""#);
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("SERVER_BIND", "10.0.0.1:9000"),
            ("PORT", "4000"),
            ("APP__ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("APP__RECORD_PATH", "  "),
            ("APP__MAX_BODY_BYTES", "2048"),
        ]),
    );

    assert_eq!(settings.server_bind, "10.0.0.1:4000");
    assert_eq!(
        settings.allowed_origins,
        vec!["https://a.example", "https://b.example"]
    );
    assert_eq!(settings.record_path, None);
    assert_eq!(settings.max_body_bytes, 2048);
}

#[test]
fn app_bind_addr_wins_over_server_bind() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[("SERVER_BIND", "1.1.1.1:1"), ("APP__BIND_ADDR", "2.2.2.2:2")]),
    );
    assert_eq!(settings.server_bind, "2.2.2.2:2");
}

#[test]
fn invalid_numeric_overrides_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[("PORT", "not-a-port"), ("APP__MAX_BODY_BYTES", "0")]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn wildcard_origin_means_any() {
    assert!(parse_origins("https://a.example, *").is_empty());
    assert_eq!(parse_origins(" ,https://a.example/,"), vec!["https://a.example"]);
}

#[test]
fn with_port_handles_bare_hosts() {
    assert_eq!(with_port("localhost", 80), "localhost:80");
    assert_eq!(with_port("127.0.0.1:3002", 5000), "127.0.0.1:5000");
}
