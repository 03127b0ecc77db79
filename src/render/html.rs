use crate::render::session::ChartSession;

/// Render a self-contained HTML report (chart data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(session: &ChartSession) -> anyhow::Result<String> {
    // "</" would close the script element early if a test name contains it.
    let json = serde_json::to_string(&session.chart_data())?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Memory stats</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  #test-name { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; min-height: 18px; }
  #test-name.inactive { visibility: hidden; }
  .container { display: flex; }
  .main { flex: 1; padding: 12px; }
  .legend { width: 280px; border-left: 1px solid #ddd; padding: 12px; }
  .legend-line { display: flex; gap: 8px; align-items: center; cursor: pointer; padding: 2px 0; font-size: 14px; }
  .legend-line.disabled { opacity: 0.4; }
  .swatch { width: 12px; height: 12px; border-radius: 2px; }
  .hover-value { margin-left: auto; font-variant-numeric: tabular-nums; color: #555; }
  #panel { padding: 12px 16px; border-top: 1px solid #ddd; }
  .log-controls input { width: 100%; padding: 6px 8px; margin: 2px 0; border: 1px solid #ddd; border-radius: 6px; }
</style>
</head>
<body>
<header>
  <h2 id="title"></h2>
  <div id="test-name" class="inactive"></div>
</header>

<div class="container">
  <div class="main">
    <canvas id="graph" width="1000" height="480"></canvas>
  </div>
  <div class="legend" id="legend"></div>
</div>

<div id="panel">
  <div id="controls"></div>
  <a id="resubmit">Reload with these logs</a>
</div>

<script>
// Embedded chart data (JSON object literal)
const DATA = __DATA__;

const PAD = { left: 90, right: 16, top: 12, bottom: 24 };
const hidden = new Set();
const hoverValues = {};
let hold = null;

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function maxY() {
  return DATA.y_ticks.length ? DATA.y_ticks[DATA.y_ticks.length - 1].value : 1;
}

function xPos(canvas, x) {
  const n = Math.max(DATA.labels.length - 1, 1);
  return PAD.left + (canvas.width - PAD.left - PAD.right) * x / n;
}

function yPos(canvas, y) {
  return canvas.height - PAD.bottom - (canvas.height - PAD.top - PAD.bottom) * y / (maxY() || 1);
}

function renderGraph() {
  const canvas = document.getElementById("graph");
  canvas.width = canvas.parentElement.clientWidth - 24;
  const ctx = canvas.getContext("2d");
  ctx.clearRect(0, 0, canvas.width, canvas.height);

  ctx.fillStyle = "#555";
  ctx.font = "12px system-ui";
  for (const t of DATA.y_ticks) {
    const y = yPos(canvas, t.value);
    ctx.fillText(t.label, 4, y + 4);
    ctx.strokeStyle = "#eee";
    ctx.beginPath();
    ctx.moveTo(PAD.left, y);
    ctx.lineTo(canvas.width - PAD.right, y);
    ctx.stroke();
  }

  for (const s of DATA.series) {
    if (hidden.has(s.name)) continue;
    ctx.strokeStyle = s.color;
    ctx.lineWidth = 1.5;
    ctx.beginPath();
    let pen = false;
    for (const p of s.points) {
      // Missing values are gaps in the line.
      if (p.y === null) { pen = false; continue; }
      const x = xPos(canvas, p.x), y = yPos(canvas, p.y);
      if (pen) ctx.lineTo(x, y); else ctx.moveTo(x, y);
      pen = true;
    }
    ctx.stroke();
  }

  if (hold !== null) {
    const x = xPos(canvas, hold);
    ctx.strokeStyle = "#999";
    ctx.beginPath();
    ctx.moveTo(x, PAD.top);
    ctx.lineTo(x, canvas.height - PAD.bottom);
    ctx.stroke();
  }
}

function renderLegend() {
  const el = document.getElementById("legend");
  el.innerHTML = "";
  for (const s of DATA.series) {
    const line = document.createElement("div");
    line.className = "legend-line" + (hidden.has(s.name) ? " disabled" : "");
    line.innerHTML = `<span class="swatch" style="background:${s.color}"></span><span>${escapeHtml(s.name)}</span>`;
    const value = document.createElement("div");
    value.className = "hover-value";
    value.textContent = "N/A";
    line.appendChild(value);
    hoverValues[s.name] = value;
    line.onclick = () => {
      if (hidden.has(s.name)) hidden.delete(s.name); else hidden.add(s.name);
      renderLegend();
      renderGraph();
    };
    el.appendChild(line);
  }
}

function showDetail(x) {
  const name = document.getElementById("test-name");
  if (x === null || x >= DATA.labels.length) {
    name.classList.add("inactive");
    for (const s of DATA.series) hoverValues[s.name].textContent = "N/A";
    return;
  }
  name.textContent = DATA.labels[x];
  name.classList.remove("inactive");
  for (const s of DATA.series) {
    const p = s.points[x];
    hoverValues[s.name].textContent = p ? p.label : "N/A";
  }
}

function positionAt(e) {
  const canvas = document.getElementById("graph");
  const rect = canvas.getBoundingClientRect();
  const n = Math.max(DATA.labels.length - 1, 1);
  const frac = (e.clientX - rect.left - PAD.left) / (canvas.width - PAD.left - PAD.right);
  if (frac < 0 || frac > 1) return null;
  return Math.round(frac * n);
}

function renderControls() {
  const controls = document.getElementById("controls");
  const urls = [];
  if (DATA.inputs.first !== null) urls.push(DATA.inputs.first);
  for (const u of DATA.inputs.additional) urls.push(u);
  for (const u of urls) {
    const div = document.createElement("div");
    div.className = "log-controls";
    div.innerHTML = `<input type="text" readonly value="${escapeHtml(u)}">`;
    controls.appendChild(div);
  }
  document.getElementById("resubmit").href = DATA.inputs.search;
}

const graph = document.getElementById("graph");
graph.addEventListener("mousemove", (e) => { if (hold === null) showDetail(positionAt(e)); });
graph.addEventListener("mouseleave", () => { if (hold === null) showDetail(null); });
graph.addEventListener("click", (e) => {
  // Hold on click.
  hold = hold === null ? positionAt(e) : null;
  showDetail(hold);
  renderGraph();
});
window.addEventListener("resize", renderGraph);

document.getElementById("title").textContent = DATA.title;
renderControls();
renderLegend();
renderGraph();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}

/// Render the page shown instead of a chart when the comparison failed.
pub fn render_error_html(message: &str) -> String {
    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Memory stats</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 24px; }
</style>
</head>
<body>
<div id="message"><h1 style="color: #d62728;">__MESSAGE__</h1></div>
</body>
</html>
"##;

    TEMPLATE.replace("__MESSAGE__", &escape_html(message))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::parse_run;
    use crate::model::reconcile;
    use crate::query::LogQuery;

    #[test]
    fn embeds_chart_data() -> anyhow::Result<()> {
        let run = parse_run(
            "MEMORY STAT resident after test: 1048576\nTEST-END | http://a/</script> | OK\n",
        );
        let dataset = reconcile(&[run])?;
        let session = ChartSession::new("nightly", LogQuery::from_urls(["run.log"])?, dataset);

        let html = render_html_report(&session)?;

        assert!(!html.contains("__DATA__"));
        assert!(html.contains(r#""title":"nightly""#));
        assert!(html.contains("1.00 MB"));
        assert!(html.contains(r#"http://a/<\/script>"#));
        Ok(())
    }

    #[test]
    fn error_page_escapes_message() {
        let html = render_error_html("No memory stats found in run <0>");
        assert!(html.contains("No memory stats found in run &lt;0&gt;"));
        assert!(html.contains("#d62728"));
    }
}
