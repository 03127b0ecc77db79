//! Renderers for a reconciled comparison.

pub mod format;
pub mod html;
pub mod session;

pub use format::format_bytes;
pub use html::{render_error_html, render_html_report};
pub use session::ChartSession;

/// Dump the aligned dataset as pretty JSON.
pub fn render_json(session: &ChartSession) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(session.dataset())?)
}
