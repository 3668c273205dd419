//! Bare import specifier rewriting.
//!
//! Browsers cannot resolve `import { html } from "lit"`. Before a script is
//! transpiled, every bare specifier is resolved with node-style resolution and
//! replaced by the URL of the resolved file under the served root.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration, ImportExpression,
    StringLiteral,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_resolver::{ResolveOptions, Resolver};
use oxc_span::{SourceType, Span};
use std::path::{Component, Path, PathBuf};

/// Whether `specifier` needs resolving before a browser can load it.
///
/// Relative (`./`, `../`), absolute (`/`) and URL-like (`https:`, `data:`) specifiers
/// are left alone.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !(specifier.is_empty()
        || specifier.starts_with('/')
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.contains(':'))
}

/// Node-style resolver that maps specifiers to URLs under the served root.
pub struct ImportResolver {
    root: PathBuf,
    resolver: Resolver,
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ImportResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        let resolver = Resolver::new(ResolveOptions {
            condition_names: vec![
                "browser".into(),
                "import".into(),
                "module".into(),
                "default".into(),
            ],
            main_fields: vec!["browser".into(), "module".into(), "main".into()],
            extensions: vec![
                ".js".into(),
                ".mjs".into(),
                ".ts".into(),
                ".tsx".into(),
                ".jsx".into(),
                ".json".into(),
            ],
            ..Default::default()
        });

        Self { root, resolver }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `specifier` as imported from `importer` and return its URL.
    ///
    /// Returns `None` when resolution fails or the target lies outside the root.
    pub fn resolve_url(&self, specifier: &str, importer: &Path) -> Option<String> {
        let from_dir = importer.parent().unwrap_or(&self.root);
        let resolved = match self.resolver.resolve(from_dir, specifier) {
            Ok(resolution) => resolution.path().to_path_buf(),
            Err(err) => {
                tracing::warn!(
                    specifier,
                    importer = %importer.display(),
                    "Could not resolve import: {err}"
                );
                return None;
            }
        };

        let Ok(relative) = resolved.strip_prefix(&self.root) else {
            tracing::warn!(
                specifier,
                resolved = %resolved.display(),
                "Resolved import lies outside the served root"
            );
            return None;
        };

        let mut url = String::new();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                url.push('/');
                url.push_str(&part.to_string_lossy());
            }
        }
        Some(url)
    }
}

/// Rewrite every bare specifier in `source` to the URL it resolves to.
///
/// Type-only imports and exports are skipped since they are erased. Specifiers
/// that fail to resolve are kept as written. Unparseable sources are returned
/// unchanged so the transpiler reports the syntax errors.
pub fn rewrite_bare_imports(source: &str, path: &Path, resolver: &ImportResolver) -> String {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path)
        .unwrap_or_default()
        .with_module(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return source.to_string();
    }

    let mut collector = SpecifierCollector::default();
    collector.visit_program(&ret.program);

    let mut edits: Vec<(Span, String)> = collector
        .found
        .into_iter()
        .filter_map(|(span, specifier)| {
            let url = resolver.resolve_url(&specifier, path)?;
            tracing::debug!(specifier, url, "Rewrote bare import");
            Some((span, quote(&url)))
        })
        .collect();
    if edits.is_empty() {
        return source.to_string();
    }

    // apply back to front so earlier spans stay valid
    edits.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
    let mut output = source.to_string();
    for (span, replacement) in edits {
        output.replace_range(span.start as usize..span.end as usize, &replacement);
    }
    output
}

fn quote(url: &str) -> String {
    serde_json::to_string(url).unwrap_or_else(|_| format!("\"{url}\""))
}

#[derive(Default)]
struct SpecifierCollector {
    found: Vec<(Span, String)>,
}

impl SpecifierCollector {
    fn push(&mut self, literal: &StringLiteral<'_>) {
        let value = literal.value.as_str();
        if is_bare_specifier(value) {
            self.found.push((literal.span, value.to_string()));
        }
    }
}

impl<'a> Visit<'a> for SpecifierCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if !decl.import_kind.is_type() {
            self.push(&decl.source);
        }
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source
            && !decl.export_kind.is_type()
        {
            self.push(source);
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !decl.export_kind.is_type() {
            self.push(&decl.source);
        }
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &expr.source {
            self.push(literal);
        }
        walk::walk_import_expression(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, ImportResolver) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let lit = root.join("node_modules/lit");
        fs::create_dir_all(&lit).unwrap();
        fs::write(
            lit.join("package.json"),
            r#"{ "name": "lit", "module": "index.js", "main": "index.cjs" }"#,
        )
        .unwrap();
        fs::write(lit.join("index.js"), "export const html = 1;").unwrap();
        fs::write(lit.join("index.cjs"), "module.exports = {};").unwrap();
        fs::create_dir_all(root.join("src")).unwrap();

        let resolver = ImportResolver::new(root);
        (temp, resolver)
    }

    #[test]
    fn test_is_bare_specifier() {
        assert!(is_bare_specifier("lit"));
        assert!(is_bare_specifier("@scope/pkg/sub"));
        assert!(!is_bare_specifier("./local.js"));
        assert!(!is_bare_specifier("../up.js"));
        assert!(!is_bare_specifier("/abs.js"));
        assert!(!is_bare_specifier("https://cdn.example/x.js"));
        assert!(!is_bare_specifier(""));
    }

    #[test]
    fn test_resolve_url_prefers_module_field() {
        let (temp, resolver) = project();
        let importer = temp.path().join("src/app.ts");

        assert_eq!(
            resolver.resolve_url("lit", &importer).as_deref(),
            Some("/node_modules/lit/index.js")
        );
        assert_eq!(resolver.resolve_url("missing-pkg", &importer), None);
    }

    #[test]
    fn test_rewrite_static_and_dynamic_imports() {
        let (temp, resolver) = project();
        let importer = temp.path().join("src/app.ts");
        let source = r#"import { html } from "lit";
import local from "./local.js";
export * from 'lit';
const lazy = import("lit");
"#;

        let output = rewrite_bare_imports(source, &importer, &resolver);

        assert_eq!(
            output,
            r#"import { html } from "/node_modules/lit/index.js";
import local from "./local.js";
export * from "/node_modules/lit/index.js";
const lazy = import("/node_modules/lit/index.js");
"#
        );
    }

    #[test]
    fn test_type_only_imports_are_left_alone() {
        let (temp, resolver) = project();
        let importer = temp.path().join("src/app.ts");
        let source = "import type { TemplateResult } from \"lit\";\n";

        assert_eq!(rewrite_bare_imports(source, &importer, &resolver), source);
    }

    #[test]
    fn test_unresolvable_and_unparseable_sources_unchanged() {
        let (temp, resolver) = project();
        let importer = temp.path().join("src/app.js");

        let missing = "import x from \"not-installed\";\n";
        assert_eq!(rewrite_bare_imports(missing, &importer, &resolver), missing);

        let broken = "import { from \"lit\"";
        assert_eq!(rewrite_bare_imports(broken, &importer, &resolver), broken);
    }
}
