use modorder_core::config::{dirs_path, GlobalConfig, ResolverConfig};
use tempfile::TempDir;

#[test]
fn test_global_config_default_resolver() {
    let config = GlobalConfig::default();
    assert_eq!(config.resolver.max_passes, 256);
    assert!(config.resolver.expand_optional);
}

#[test]
fn test_global_config_defaults_from_empty_toml() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.resolver, ResolverConfig::default());
    assert!(config.output.show_warnings);
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[resolver]
max-passes = 8
expand-optional = false

[output]
show-warnings = false
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.resolver.max_passes, 8);
    assert!(!config.resolver.expand_optional);
    assert!(!config.output.show_warnings);
}

#[test]
fn test_load_from_missing_file_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("nope.toml")).unwrap();
    assert_eq!(config.resolver, ResolverConfig::default());
}

#[test]
fn test_load_from_invalid_file_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolver\nmax-passes = ").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Config error"), "got: {err}");
}

#[test]
fn test_dirs_path_is_modorder_dir() {
    let path = dirs_path();
    if std::env::var(modorder_core::config::HOME_ENV).is_err() {
        assert!(path.ends_with(".modorder"));
    }
}
