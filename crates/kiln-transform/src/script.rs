//! JavaScript/TypeScript transpiling with oxc.

use crate::imports::{ImportResolver, rewrite_bare_imports};
use crate::options::TscOptions;
use async_trait::async_trait;
use kiln_core::{Transform, TransformError};
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::Transformer;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Strips types and JSX, lowers syntax to the configured target and rewrites bare
/// imports.
#[derive(Debug, Clone, Default)]
pub struct ScriptTransformer {
    options: Arc<TscOptions>,
    resolver: Option<Arc<ImportResolver>>,
    prelude: Option<Arc<str>>,
}

impl ScriptTransformer {
    pub fn new(options: Arc<TscOptions>) -> Self {
        Self {
            options,
            resolver: None,
            prelude: None,
        }
    }

    /// Rewrite bare specifiers through `resolver` before transpiling.
    pub fn with_resolver(mut self, resolver: Arc<ImportResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Prepend `prelude` to every emitted script.
    pub fn with_prelude(mut self, prelude: impl Into<Arc<str>>) -> Self {
        self.prelude = Some(prelude.into());
        self
    }

    pub fn options(&self) -> &TscOptions {
        &self.options
    }

    /// Transpile `source` synchronously.
    pub fn transpile(&self, path: &Path, source: &str) -> Result<String, TransformError> {
        let rewritten;
        let source = match &self.resolver {
            Some(resolver) => {
                rewritten = rewrite_bare_imports(source, path, resolver);
                rewritten.as_str()
            }
            None => source,
        };

        let transform_options =
            self.options
                .transform_options()
                .map_err(|message| TransformError::Compiler {
                    path: path.to_path_buf(),
                    message,
                })?;

        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path)
            .unwrap_or_default()
            .with_module(true);

        let ParserReturn {
            mut program,
            errors,
            ..
        } = Parser::new(&allocator, source, source_type).parse();
        if !errors.is_empty() {
            return Err(diagnostics(path, &errors));
        }

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let ret = Transformer::new(&allocator, path, &transform_options)
            .build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            return Err(diagnostics(path, &ret.errors));
        }

        let code = Codegen::new().build(&program).code;
        Ok(match &self.prelude {
            Some(prelude) => format!("{prelude}{code}"),
            None => code,
        })
    }
}

fn diagnostics(path: &Path, errors: &[impl std::fmt::Display]) -> TransformError {
    TransformError::Diagnostics {
        path: path.to_path_buf(),
        messages: errors.iter().map(|e| e.to_string()).collect(),
    }
}

#[async_trait]
impl Transform for ScriptTransformer {
    async fn transform(
        &self,
        url: &str,
        path: &Path,
        source: String,
    ) -> Result<String, TransformError> {
        tracing::debug!(url, "Transpiling script");
        let transformer = self.clone();
        let path = path.to_path_buf();

        // parse and codegen are CPU-bound, keep them off the async workers
        task::spawn_blocking(move || transformer.transpile(&path, &source))
            .await
            .map_err(|e| TransformError::Io(format!("Transpile task failed: {}", e)))?
    }
}
