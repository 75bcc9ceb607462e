use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use njast_config::{
    discover_config_path, load_for_dir, with_config_env_lock, ConfigWarning, NjastConfig,
    NJAST_CONFIG_ENV_VAR,
};
use njast_syntax::JavaLevel;

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

#[test]
fn discovers_config_in_an_ancestor() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NJAST_CONFIG_ENV_VAR);
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("njast.toml");
        std::fs::write(&config_path, "[parse]\nstrict = false\n").unwrap();
        let nested = dir.path().join("src").join("main").join("java");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_config_path(&nested), Some(canonical(config_path)));
    });
}

#[test]
fn plain_name_wins_over_hidden_name() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NJAST_CONFIG_ENV_VAR);
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".njast.toml"), "").unwrap();
        std::fs::write(dir.path().join("njast.toml"), "").unwrap();

        assert_eq!(
            discover_config_path(dir.path()),
            Some(canonical(dir.path().join("njast.toml")))
        );
    });
}

#[test]
fn env_override_wins_over_discovered_file() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("njast.toml"), "[parse]\nlevel = 7\n").unwrap();
        let override_path = dir.path().join("override.toml");
        std::fs::write(
            &override_path,
            "[parse]\nlevel = 6\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let _env = EnvVarGuard::set(NJAST_CONFIG_ENV_VAR, &override_path);

        let (config, path, diagnostics) = load_for_dir(dir.path()).unwrap();
        assert_eq!(path, Some(canonical(override_path)));
        assert_eq!(config.level(), JavaLevel::JDK6);
        assert_eq!(config.logging.level, "debug");
        assert!(diagnostics.is_empty());
    });
}

#[test]
fn missing_config_yields_defaults() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NJAST_CONFIG_ENV_VAR);
        let dir = tempdir().unwrap();
        // Ancestors of a temp dir could carry a config; only check the
        // result when none was found.
        let (config, path, _) = load_for_dir(dir.path()).unwrap();
        if path.is_none() {
            assert_eq!(config, NjastConfig::default());
        }
    });
}

#[test]
fn all_sections_load() {
    let text = r#"
[parse]
strict = false
level = 6

[resolver]
extra_source_roots = ["gen/java", "/abs/java"]
cache = false

[logging]
level = "njast.resolve=debug"
json = true
file = "njast.log"
typo = 1
"#;
    let (config, diagnostics) = NjastConfig::load_from_str_with_diagnostics(text).unwrap();
    assert!(!config.parse.strict);
    assert_eq!(config.parse_options().level, JavaLevel::JDK6);
    assert!(!config.parse_options().strict);
    assert_eq!(
        config.resolver.extra_source_roots,
        vec![PathBuf::from("gen/java"), PathBuf::from("/abs/java")]
    );
    assert!(!config.resolver.cache);
    assert!(config.logging.json);
    assert_eq!(config.logging.file, Some(PathBuf::from("njast.log")));

    assert_eq!(diagnostics.unknown_keys, vec!["logging.typo"]);
    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::ExtraSourceRootAbsolute {
            toml_path: "resolver.extra_source_roots[1]".to_owned()
        }]
    );
    assert!(diagnostics.is_ok());
}

#[test]
fn malformed_toml_is_an_error() {
    let err = NjastConfig::load_from_str_with_diagnostics("[parse\nstrict = ").unwrap_err();
    assert!(err.to_string().starts_with("failed to parse toml config"));
}
