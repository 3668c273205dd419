//! Runtime globals prepended to served scripts.

/// Script prepended to every compiled module.
///
/// Always defines `process.env.NODE_ENV` as `"development"` when the page has not
/// set it. With `live_reload`, also connects to `ws://<host>:<ws_port>` when the page
/// is served from a local host and reloads on any message. The connection lives on
/// `globalThis` so a page importing many modules opens one socket.
pub fn runtime_prelude(ws_port: u16, live_reload: bool) -> String {
    let mut prelude = String::from(
        "globalThis.process = globalThis.process || { env: {} };\n\
         globalThis.process.env = globalThis.process.env || {};\n\
         globalThis.process.env.NODE_ENV = globalThis.process.env.NODE_ENV || \"development\";\n",
    );

    if live_reload {
        prelude.push_str(&format!(
            "if (!globalThis.__kilnReload && typeof location !== \"undefined\" && \
             /^(localhost|127\\.0\\.0\\.1|\\[::1\\]|0\\.0\\.0\\.0)$/.test(location.hostname)) {{\n  \
             globalThis.__kilnReload = new WebSocket(\"ws://\" + location.hostname + \":{ws_port}\");\n  \
             globalThis.__kilnReload.onmessage = () => location.reload();\n\
             }}\n"
        ));
    }

    prelude
}
