use super::cells;
use crate::application::dto::AuditResponse;
use crate::audit::domain::Dependency;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

const HEADERS: [&str; 10] = [
    "technology",
    "name",
    "version",
    "version_date",
    "latest_version",
    "latest_version_date",
    "risks",
    "level",
    "groups",
    "vulnerabilities",
];

/// CsvFormatter adapter rendering one row per reported package
///
/// Rows of every technology share one table; summaries and removed ignore
/// entries are left out so the output stays machine-readable.
pub struct CsvFormatter {
    headers: bool,
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self { headers: true }
    }

    /// Emits the header row first; on by default.
    pub fn with_headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    /// Quotes a field containing a separator, quote or line break (RFC 4180).
    fn escape_field(text: &str) -> String {
        if text.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text.to_string()
        }
    }

    fn row(dependency: &Dependency) -> [String; 10] {
        [
            dependency.technology.to_string(),
            dependency.name.clone(),
            dependency.resolved_version.clone(),
            cells::date(dependency.version_date),
            cells::latest_version(dependency).to_string(),
            cells::date(dependency.latest_version_date),
            cells::risks(&dependency.flags),
            dependency.risk_level().as_str().to_string(),
            cells::groups(dependency),
            cells::vulnerabilities(dependency),
        ]
    }

    fn push_line<S: AsRef<str>>(output: &mut String, fields: &[S]) {
        let line: Vec<String> = fields
            .iter()
            .map(|field| Self::escape_field(field.as_ref()))
            .collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for CsvFormatter {
    fn format(&self, response: &AuditResponse) -> Result<String> {
        let mut output = String::new();
        if self.headers {
            Self::push_line(&mut output, &HEADERS);
        }
        for report in &response.reports {
            for dependency in &report.packages {
                Self::push_line(&mut output, &Self::row(dependency));
            }
        }
        Ok(output)
    }
}
