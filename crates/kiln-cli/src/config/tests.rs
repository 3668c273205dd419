#[cfg(test)]
mod tests {
    use crate::cli::{CheckArgs, OptionFileArgs, ServeArgs};
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, json: &str) -> PathBuf {
        let path = temp.path().join("kiln.config.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn with_config(path: PathBuf) -> ConfigOverrides {
        ConfigOverrides {
            config_file: Some(path),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let config = ServeConfig::load(&ConfigOverrides::default()).unwrap();

        assert_eq!(config, ServeConfig::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.ws_port, 5001);
        assert_eq!(config.index, PathBuf::from("index.html"));
        assert_eq!(config.asc_compiler, "asc");
        assert!(!config.disable_spa);
        assert!(!config.watch_files);
    }

    #[test]
    #[serial]
    fn test_config_file_layer() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"{ "port": 8080, "watchFiles": true, "tscOptionsFile": "tsconfig.kiln.json" }"#,
        );

        let config = ServeConfig::load(&with_config(path)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.ws_port, 5001);
        assert!(config.watch_files);
        assert_eq!(
            config.tsc_options_file,
            Some(PathBuf::from("tsconfig.kiln.json"))
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{ "port": 8080, "wsPort": 8081 }"#);

        unsafe {
            std::env::set_var("KILN_WS_PORT", "9001");
        }
        let config = ServeConfig::load(&with_config(path));
        unsafe {
            std::env::remove_var("KILN_WS_PORT");
        }

        let config = config.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.ws_port, 9001);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env_and_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{ "port": 8080, "host": "0.0.0.0" }"#);

        unsafe {
            std::env::set_var("KILN_PORT", "7000");
        }
        let args = ServeArgs {
            port: Some(3000),
            disable_spa: true,
            files: OptionFileArgs {
                config: Some(path),
                ..OptionFileArgs::default()
            },
            ..ServeArgs::default()
        };
        let config = ServeConfig::load(&ConfigOverrides::from(&args));
        unsafe {
            std::env::remove_var("KILN_PORT");
        }

        let config = config.unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.disable_spa);
    }

    #[test]
    #[serial]
    fn test_unset_flags_do_not_override_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{ "disableSpa": true, "watchFiles": true }"#);

        let args = ServeArgs {
            files: OptionFileArgs {
                config: Some(path),
                ..OptionFileArgs::default()
            },
            ..ServeArgs::default()
        };
        let config = ServeConfig::load(&ConfigOverrides::from(&args)).unwrap();

        assert!(config.disable_spa);
        assert!(config.watch_files);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config_file() {
        let args = CheckArgs {
            files: OptionFileArgs {
                config: Some(PathBuf::from("/definitely/not/here/kiln.config.json")),
                ..OptionFileArgs::default()
            },
        };

        let err = ServeConfig::load(&ConfigOverrides::from(&args)).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_unknown_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{ "prot": 8080 }"#);

        let err = ServeConfig::load(&with_config(path)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Hint:"), "{msg}");
    }

    #[test]
    fn test_validate_port_conflict() {
        let temp = TempDir::new().unwrap();
        let config = ServeConfig {
            root: temp.path().to_path_buf(),
            port: 4000,
            ws_port: 4000,
            ..ServeConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::PortConflict(4000))));
    }

    #[test]
    fn test_validate_root_must_exist() {
        let config = ServeConfig {
            root: PathBuf::from("/definitely/not/a/dir"),
            ..ServeConfig::default()
        };
        assert!(config.validate().is_err());

        let temp = TempDir::new().unwrap();
        let config = ServeConfig {
            root: temp.path().to_path_buf(),
            ..ServeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization_skips_unset_files() {
        let json = serde_json::to_value(ServeConfig::default()).unwrap();
        assert!(json.get("wsPort").is_some());
        assert!(json.get("headersFile").is_none());
        assert!(json.get("ws_port").is_none());

        let overrides = serde_json::to_value(ConfigOverrides::default()).unwrap();
        assert_eq!(overrides, serde_json::json!({}));
    }
}
