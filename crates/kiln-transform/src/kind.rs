//! Asset classification by file extension.

use std::path::Path;

/// How a requested file is compiled before serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// JavaScript or TypeScript, with or without JSX
    Script,
    /// AssemblyScript source compiled to a WebAssembly ES module
    AssemblyScript,
    /// Served byte-for-byte
    Static,
}

impl AssetKind {
    /// Classify a URL or path by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match extension(path.as_ref()) {
            "js" | "mjs" | "jsx" | "ts" | "mts" | "tsx" => AssetKind::Script,
            "as" => AssetKind::AssemblyScript,
            _ => AssetKind::Static,
        }
    }

    /// Whether files of this kind are served as JavaScript.
    pub fn is_compiled(self) -> bool {
        !matches!(self, AssetKind::Static)
    }

    /// MIME type for a URL or path, taking compilation into account.
    pub fn content_type(path: impl AsRef<Path>) -> &'static str {
        let path = path.as_ref();
        if Self::from_path(path).is_compiled() {
            return "application/javascript";
        }

        match extension(path) {
            "wasm" => "application/wasm",
            "json" | "map" => "application/json",
            "html" | "htm" => "text/html; charset=utf-8",
            "css" => "text/css",
            "txt" => "text/plain; charset=utf-8",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "webp" => "image/webp",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            "ttf" => "font/ttf",
            _ => "application/octet-stream",
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_scripts() {
        for url in ["/a.js", "/a.mjs", "/a.jsx", "/a.ts", "/a.mts", "/a.tsx"] {
            assert_eq!(AssetKind::from_path(url), AssetKind::Script, "{url}");
        }
    }

    #[test]
    fn test_classify_assemblyscript_and_static() {
        assert_eq!(AssetKind::from_path("/add.as"), AssetKind::AssemblyScript);
        assert_eq!(AssetKind::from_path("/add.wasm"), AssetKind::Static);
        assert_eq!(AssetKind::from_path("/"), AssetKind::Static);
        assert_eq!(AssetKind::from_path("/routes/settings"), AssetKind::Static);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(AssetKind::content_type("/app.ts"), "application/javascript");
        assert_eq!(AssetKind::content_type("/add.as"), "application/javascript");
        assert_eq!(AssetKind::content_type("/add.wasm"), "application/wasm");
        assert_eq!(
            AssetKind::content_type("/index.html"),
            "text/html; charset=utf-8"
        );
        assert_eq!(AssetKind::content_type("/blob"), "application/octet-stream");
    }
}
