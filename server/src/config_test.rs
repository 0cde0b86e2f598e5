use super::*;

fn lookup_from(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    let pairs = pairs.to_vec();
    move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_owned())
}

// =============================================================================
// env_bool
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On"] {
        let lookup = move |_: &str| Some(val.to_owned());
        assert_eq!(env_bool(&lookup, "K"), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn env_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        let lookup = move |_: &str| Some(val.to_owned());
        assert_eq!(env_bool(&lookup, "K"), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn env_bool_invalid_or_unset_returns_none() {
    assert_eq!(env_bool(&lookup_from(&[("K", "maybe")]), "K"), None);
    assert_eq!(env_bool(&lookup_from(&[]), "K"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_reads_trimmed_numbers() {
    assert_eq!(env_parse::<u16>(&lookup_from(&[("PORT", " 8080 ")]), "PORT"), Some(8080));
}

#[test]
fn env_parse_garbage_is_none() {
    assert_eq!(env_parse::<u32>(&lookup_from(&[("N", "five")]), "N"), None);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn missing_database_url_is_an_error() {
    let err = Config::from_lookup(lookup_from(&[("PORT", "1")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn blank_database_url_is_an_error() {
    assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).is_err());
}

#[test]
fn defaults_apply() {
    let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();
    assert_eq!(config.port, 3000);
    assert_eq!(config.db_max_connections, 5);
    assert_eq!(config.session_ttl_hours, 168);
    assert!(!config.cookie_secure);
}

#[test]
fn overrides_apply() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", "4000"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("SESSION_TTL_HOURS", "24"),
        ("COOKIE_SECURE", "yes"),
    ]))
    .unwrap();
    assert_eq!(config.port, 4000);
    assert_eq!(config.db_max_connections, 12);
    assert_eq!(config.session_ttl_hours, 24);
    assert!(config.cookie_secure);
}

#[test]
fn unparseable_numbers_fall_back() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", "http"),
        ("SESSION_TTL_HOURS", "-3"),
    ]))
    .unwrap();
    assert_eq!(config.port, 3000);
    assert_eq!(config.session_ttl_hours, 168);
}
