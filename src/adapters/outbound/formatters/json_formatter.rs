use crate::application::dto::{AuditResponse, TechnologyReport};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    tool: Tool,
    has_risks: bool,
    reports: &'a [TechnologyReport],
    removed_ignore_entries: Vec<String>,
}

#[derive(Serialize)]
struct Tool {
    name: &'static str,
    version: &'static str,
}

/// JsonFormatter adapter producing machine-readable output for CI pipelines
///
/// Dates serialize as `YYYY-MM-DD`; unknown values serialize as `null`.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, response: &AuditResponse) -> Result<String> {
        let document = JsonReport {
            tool: Tool {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            has_risks: response.has_risks(),
            reports: &response.reports,
            removed_ignore_entries: response
                .removed_entries
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        let mut rendered = serde_json::to_string_pretty(&document)?;
        rendered.push('\n');
        Ok(rendered)
    }
}
