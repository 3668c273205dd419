//! WebAssembly to ES module wrapping.

use std::fmt::Write;

/// Wrap a compiled WebAssembly binary in an ES module.
///
/// The module's default export is `init(imports)`, which instantiates the embedded
/// bytes and resolves to the instance exports. An `env.abort` that throws is
/// supplied unless the caller passes one.
pub fn wrap_wasm_module(bytes: &[u8]) -> String {
    let mut array = String::with_capacity(bytes.len() * 4);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            array.push(',');
        }
        let _ = write!(array, "{byte}");
    }

    format!(
        "const bytes = new Uint8Array([{array}]);\n\
         export default async function init(imports = {{}}) {{\n  \
         const env = {{\n    \
         abort(msg, file, line, column) {{\n      \
         throw new Error(`abort at ${{line}}:${{column}}`);\n    \
         }},\n    \
         ...(imports.env || {{}}),\n  \
         }};\n  \
         const {{ instance }} = await WebAssembly.instantiate(bytes, {{ ...imports, env }});\n  \
         return instance.exports;\n\
         }}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_MODULE: &[u8] = &[0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

    #[test]
    fn test_embeds_bytes() {
        let module = wrap_wasm_module(EMPTY_MODULE);
        assert!(module.starts_with("const bytes = new Uint8Array([0,97,115,109,1,0,0,0]);"));
        assert!(module.contains("export default async function init(imports = {})"));
        assert!(module.contains("WebAssembly.instantiate(bytes"));
    }

    #[test]
    fn test_empty_input() {
        let module = wrap_wasm_module(&[]);
        assert!(module.starts_with("const bytes = new Uint8Array([]);"));
    }
}
