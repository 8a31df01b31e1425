//! SVG equity-curve rendering for reports.

use crate::domain::ledger::EquityPoint;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 40.0;
const PAD_BOTTOM: f64 = 50.0;

/// Cumulative PnL against exit time, with a dashed zero baseline.
/// Returns an empty string when there is nothing to plot.
pub fn generate_equity_svg(curve: &[EquityPoint], title: &str) -> String {
    if curve.is_empty() {
        return String::new();
    }

    // Zero is always inside the y range so the baseline is visible.
    let min_pnl = curve
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::min);
    let max_pnl = curve
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::max);

    let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;

    let range = max_pnl - min_pnl;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let y_of = |v: f64| PAD_TOP + plot_height - (v - min_pnl) * scale_y;

    // x is proportional to elapsed time since the first exit.
    let start = curve[0].time;
    let span = (curve[curve.len() - 1].time - start).num_seconds() as f64;
    let x_of = |p: &EquityPoint| {
        if span > 0.0 {
            PAD_LEFT + (p.time - start).num_seconds() as f64 / span * plot_width
        } else {
            PAD_LEFT + plot_width / 2.0
        }
    };

    let points: Vec<String> = curve
        .iter()
        .map(|p| format!("{:.1},{:.1}", x_of(p), y_of(p.cumulative_pnl)))
        .collect();

    let zero_y = y_of(0.0);
    let x_end = PAD_LEFT + plot_width;
    let y_bottom = PAD_TOP + plot_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}" font-family="sans-serif" font-size="12">"#
    ));
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape_xml(title)
    ));

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{PAD_LEFT:.1}" y1="{PAD_TOP:.1}" x2="{PAD_LEFT:.1}" y2="{y_bottom:.1}" stroke="black"/>"#
    ));
    svg.push_str(&format!(
        r#"<line x1="{PAD_LEFT:.1}" y1="{y_bottom:.1}" x2="{x_end:.1}" y2="{y_bottom:.1}" stroke="black"/>"#
    ));

    svg.push_str(&format!(
        r#"<line x1="{PAD_LEFT:.1}" y1="{zero_y:.1}" x2="{x_end:.1}" y2="{zero_y:.1}" stroke="gray" stroke-dasharray="6,4"/>"#
    ));

    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
        points.join(" ")
    ));

    // y ticks at the range ends
    for value in [min_pnl, max_pnl] {
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PAD_LEFT - 6.0,
            y_of(value) + 4.0,
            value
        ));
    }

    // x ticks at first and last exit
    let first = curve[0].time.format("%H:%M");
    let last = curve[curve.len() - 1].time.format("%H:%M");
    svg.push_str(&format!(
        r#"<text x="{PAD_LEFT:.1}" y="{:.1}" text-anchor="start">{first}</text>"#,
        y_bottom + 16.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x_end:.1}" y="{:.1}" text-anchor="end">{last}</text>"#,
        y_bottom + 16.0
    ));

    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Time</text>"#,
        PAD_LEFT + plot_width / 2.0,
        HEIGHT - 10.0
    ));
    svg.push_str(&format!(
        r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">Cumulative PnL ($)</text>"#,
        PAD_TOP + plot_height / 2.0,
        PAD_TOP + plot_height / 2.0
    ));

    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
