use crate::config::{ConfigOverrides, ServeConfig};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use std::path::Path;

/// Config file picked up from the working directory.
pub const CONFIG_FILE: &str = "kiln.config.json";

/// Prefix of environment variables, e.g. `KILN_WS_PORT=6001`.
pub const ENV_PREFIX: &str = "KILN_";

impl ServeConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        Self::figment(overrides)?.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {CONFIG_FILE} syntax and {ENV_PREFIX}* variables"),
            }
            .into()
        })
    }

    fn figment(overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(ServeConfig::default()));

        // An explicit --config must exist; the default file is optional
        let config_file = match &overrides.config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(path) => Some(path.clone()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Json::file(path));
        }

        // KILN_WS_PORT -> wsPort
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| snake_to_camel(key.as_str()).into()),
        );

        Ok(figment.merge(Serialized::defaults(overrides)))
    }
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::snake_to_camel;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("ws_port"), "wsPort");
        assert_eq!(snake_to_camel("tsc_options_file"), "tscOptionsFile");
        assert_eq!(snake_to_camel("port"), "port");
    }
}
