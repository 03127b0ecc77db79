//! User-facing diagnostics routed through the `log` facade.

use env_logger::Env;

/// Install the global logger. `RUST_LOG` overrides the default `info` level.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Emit a warning that does not stop the report.
pub fn warn(msg: impl AsRef<str>) {
    log::warn!("{}", msg.as_ref());
}

/// Record a fatal message and hand it back for use as error context.
pub fn error_message(msg: impl Into<String>) -> String {
    let msg = msg.into();
    log::error!("{}", msg);
    msg
}
