//! Typst report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file),
//! resolves all `{{PLACEHOLDER}}` markers using helpers from `chart_svg` and
//! `tables`, and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::error::TradesimError;
use crate::domain::ledger::{Ledger, LedgerSummary};
use crate::domain::simulator::SimulationParams;
use crate::ports::report_port::{ReportPort, SessionInfo};

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub ledger: &'a Ledger,
    pub summary: &'a LedgerSummary,
    pub params: &'a SimulationParams,
    pub session: &'a SessionInfo,
}

pub fn chart_title(symbol: &str) -> String {
    format!("{} Strategy Equity Curve", symbol)
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup ready to be written to a `.typ` file.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let mut output = template.to_string();

    let title = format!("{} Intraday Simulation", ctx.session.symbol);
    output = output.replace("{{TITLE}}", &tables::typst_escape(&title));

    let session = tables::render_session_summary(ctx.params, ctx.session);
    output = output.replace("{{SESSION_SUMMARY}}", &session);

    let summary = tables::render_summary_table(ctx.summary);
    output = output.replace("{{SUMMARY_TABLE}}", &summary);

    // Equity curve SVG wrapped in Typst image.decode
    let equity_svg =
        chart_svg::generate_equity_svg(&ctx.ledger.equity_curve(), &chart_title(&ctx.session.symbol));
    let equity_typst = if equity_svg.is_empty() {
        "_No trades executed._".to_string()
    } else {
        format!(
            "#image.decode(\n\"{}\",\n  width: 100%,\n)",
            equity_svg.replace('\\', "\\\\").replace('"', "\\\"")
        )
    };
    output = output.replace("{{EQUITY_CURVE_SVG}}", &equity_typst);

    let trade_log = tables::render_trade_log(ctx.ledger);
    output = output.replace("{{TRADE_LOG}}", &trade_log);

    output
}

/// Writes a `.typ` report using the default or a custom template.
#[derive(Debug, Clone, Default)]
pub struct TypstReportAdapter {
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: String) -> Self {
        Self {
            template: Some(template),
        }
    }

    pub fn from_template_file(path: &Path) -> Result<Self, TradesimError> {
        let template = fs::read_to_string(path).map_err(|e| {
            TradesimError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read template {}: {}", path.display(), e),
            ))
        })?;
        Ok(Self::with_template(template))
    }

    fn template(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or(default_template::template())
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        ledger: &Ledger,
        params: &SimulationParams,
        session: &SessionInfo,
        output_path: &str,
    ) -> Result<(), TradesimError> {
        let summary = LedgerSummary::compute(ledger);
        let ctx = ReportContext {
            ledger,
            summary: &summary,
            params,
            session,
        };
        let content = resolve(self.template(), &ctx);

        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;

        info!(path = %path.display(), "report written");
        Ok(())
    }
}
