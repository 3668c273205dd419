//! AssemblyScript compilation through an external `asc`.

use crate::options::AscOptions;
use crate::wasm::wrap_wasm_module;
use async_trait::async_trait;
use kiln_core::{Transform, TransformError};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Compiles `.as` files to WebAssembly and serves them as ES modules.
#[derive(Debug, Clone)]
pub struct AssemblyScriptTransformer {
    command: Vec<String>,
    options: Arc<AscOptions>,
}

impl AssemblyScriptTransformer {
    /// `command` is split on whitespace, so launchers like `npx asc` work.
    pub fn new(command: &str, options: Arc<AscOptions>) -> Self {
        Self {
            command: command.split_whitespace().map(str::to_string).collect(),
            options,
        }
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("asc")
    }

    /// Compile `path` and return the raw WebAssembly binary.
    pub async fn compile(&self, path: &Path) -> Result<Vec<u8>, TransformError> {
        let compiler_error = |message: String| TransformError::Compiler {
            path: path.to_path_buf(),
            message,
        };

        let out_dir = tempfile::tempdir().map_err(|e| TransformError::Io(e.to_string()))?;
        let out_file = out_dir.path().join("module.wasm");

        let mut cmd = Command::new(self.program());
        cmd.args(self.command.iter().skip(1))
            .arg(path)
            .arg("--outFile")
            .arg(&out_file)
            .args(self.options.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = path.parent() {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            compiler = self.program(),
            file = %path.display(),
            "Running AssemblyScript compiler"
        );
        let output = cmd
            .output()
            .await
            .map_err(|e| compiler_error(format!("failed to run '{}': {}", self.program(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(compiler_error(format!(
                "'{}' exited with code {}: {}",
                self.program(),
                code,
                stderr
            )));
        }

        tokio::fs::read(&out_file).await.map_err(|e| {
            compiler_error(format!(
                "compiler produced no output at {}: {}",
                out_file.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl Transform for AssemblyScriptTransformer {
    async fn transform(
        &self,
        url: &str,
        path: &Path,
        _source: String,
    ) -> Result<String, TransformError> {
        tracing::debug!(url, "Compiling AssemblyScript");
        let wasm = self.compile(path).await?;
        Ok(wrap_wasm_module(&wasm))
    }
}
