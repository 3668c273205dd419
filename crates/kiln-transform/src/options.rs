//! Compiler option documents.
//!
//! Both documents are optional JSON files supplied by the user and watched by the
//! server; these types are what they deserialize into.

use oxc_transformer::TransformOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ES module format of the emitted scripts.
///
/// Browsers only load ES modules, so CommonJS-style kinds are rejected at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    #[default]
    #[serde(rename = "ES2015", alias = "es2015", alias = "ES6", alias = "es6")]
    Es2015,
    #[serde(rename = "ES2020", alias = "es2020")]
    Es2020,
    #[serde(rename = "ES2022", alias = "es2022")]
    Es2022,
    #[serde(rename = "ESNext", alias = "esnext", alias = "ESNEXT")]
    EsNext,
}

/// TypeScript compiler options.
///
/// Accepts the `compilerOptions` object of a tsconfig; fields that have no
/// meaning for single-file transpiling are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TscOptions {
    pub module: ModuleKind,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsx_import_source: Option<String>,
}

impl Default for TscOptions {
    fn default() -> Self {
        Self {
            module: ModuleKind::Es2015,
            target: "ES2015".to_string(),
            jsx_import_source: None,
        }
    }
}

impl TscOptions {
    /// Build oxc transform options for these settings.
    ///
    /// # Errors
    ///
    /// Returns a message when `target` is not an ECMAScript version oxc knows.
    pub fn transform_options(&self) -> Result<TransformOptions, String> {
        let mut options = TransformOptions::from_target(&self.target.to_lowercase())
            .map_err(|err| format!("invalid target '{}': {}", self.target, err))?;
        if let Some(source) = &self.jsx_import_source {
            options.jsx.import_source = Some(source.clone());
        }
        Ok(options)
    }
}

/// AssemblyScript compiler options, passed to `asc` as flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AscOptions(pub Map<String, Value>);

impl AscOptions {
    /// Convert to `asc` command-line arguments.
    ///
    /// `true` becomes a bare `--flag`, `false` and `null` are dropped, arrays repeat
    /// the flag per element, everything else is passed as `--flag value`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (name, value) in &self.0 {
            push_flag(&mut args, name, value);
        }
        args
    }
}

fn push_flag(args: &mut Vec<String>, name: &str, value: &Value) {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => args.push(format!("--{name}")),
        Value::String(s) => {
            args.push(format!("--{name}"));
            args.push(s.clone());
        }
        Value::Array(items) => {
            for item in items {
                push_flag(args, name, item);
            }
        }
        other => {
            args.push(format!("--{name}"));
            args.push(other.to_string());
        }
    }
}
