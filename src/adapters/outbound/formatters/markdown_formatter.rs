use super::cells;
use crate::application::dto::{AuditResponse, TechnologyReport};
use crate::audit::domain::{Dependency, Technology};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// Markdown table header for reported packages
const TABLE_HEADER: &str =
    "| Package | Version | Released | Latest | Latest Released | Risks | Level | Groups |\n";

/// Markdown table separator line
const TABLE_SEPARATOR: &str =
    "|---------|---------|----------|--------|-----------------|-------|-------|--------|\n";

/// Markdown table header for advisories
const VULN_TABLE_HEADER: &str = "| Package | Version | Advisory | Severity | Fixed Version | Summary |\n";

/// Markdown table separator line for advisories
const VULN_TABLE_SEPARATOR: &str =
    "|---------|---------|----------|----------|---------------|---------|\n";

/// MarkdownFormatter adapter rendering the audit as Markdown tables
///
/// Package names link to their registry page.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn package_link(dependency: &Dependency) -> String {
        let url = match dependency.technology {
            Technology::Node => format!("https://www.npmjs.com/package/{}", dependency.name),
            Technology::Ruby => format!("https://rubygems.org/gems/{}", dependency.name),
        };
        format!("[{}]({})", Self::escape_cell(&dependency.name), url)
    }

    fn render_packages(output: &mut String, report: &TechnologyReport) {
        output.push_str(&format!("## {}\n\n", report.technology));
        output.push_str(&format!(
            "{} of {} resolved package(s) reported.\n\n",
            report.packages.len(),
            report.total_count
        ));

        if report.packages.is_empty() {
            output.push_str("*No risky packages found.*\n\n");
        } else {
            output.push_str(TABLE_HEADER);
            output.push_str(TABLE_SEPARATOR);
            for dependency in &report.packages {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                    Self::package_link(dependency),
                    Self::escape_cell(&dependency.resolved_version),
                    cells::date(dependency.version_date),
                    Self::escape_cell(cells::latest_version(dependency)),
                    cells::date(dependency.latest_version_date),
                    cells::risks(&dependency.flags),
                    dependency.risk_level().as_str(),
                    cells::groups(dependency),
                ));
            }
            output.push('\n');
        }

        let mut notes = Vec::new();
        if report.ignored_count > 0 {
            notes.push(format!(
                "- {} package(s) hidden by the ignore file",
                report.ignored_count
            ));
        }
        if report.degraded_count > 0 {
            notes.push(format!(
                "- {} package(s) missing registry metadata",
                report.degraded_count
            ));
        }
        if !notes.is_empty() {
            output.push_str(&notes.join("\n"));
            output.push_str("\n\n");
        }
    }

    fn render_vulnerabilities(output: &mut String, report: &TechnologyReport) {
        let affected: Vec<&Dependency> = report
            .packages
            .iter()
            .filter(|d| !d.vulnerabilities.is_empty())
            .collect();
        if affected.is_empty() {
            return;
        }

        output.push_str(&format!("### {} advisories\n\n", report.technology));
        output.push_str(VULN_TABLE_HEADER);
        output.push_str(VULN_TABLE_SEPARATOR);
        for dependency in affected {
            for record in &dependency.vulnerabilities {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    Self::escape_cell(&dependency.name),
                    Self::escape_cell(&dependency.resolved_version),
                    Self::escape_cell(&record.id),
                    record.severity,
                    Self::escape_cell(record.fixed_version.as_deref().unwrap_or(cells::NOT_AVAILABLE)),
                    Self::escape_cell(record.summary.as_deref().unwrap_or("")),
                ));
            }
        }
        output.push('\n');
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, response: &AuditResponse) -> Result<String> {
        let mut output = String::from("# Package Audit\n\n");
        for report in &response.reports {
            Self::render_packages(&mut output, report);
            Self::render_vulnerabilities(&mut output, report);
        }

        if !response.removed_entries.is_empty() {
            output.push_str("## Removed ignore entries\n\n");
            for entry in &response.removed_entries {
                output.push_str(&format!("- {}\n", Self::escape_cell(&entry.to_string())));
            }
            output.push('\n');
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{Group, RiskFlags, Severity, VulnerabilityRecord};
    use crate::audit::services::{RemovalReason, RemovedEntry};
    use std::collections::BTreeSet;

    fn report(packages: Vec<Dependency>) -> TechnologyReport {
        TechnologyReport {
            technology: Technology::Ruby,
            total_count: 40,
            ignored_count: 0,
            degraded_count: 2,
            packages,
        }
    }

    fn nokogiri() -> Dependency {
        let mut dependency = Dependency::new(
            "nokogiri",
            "~> 1.13",
            "1.13.0",
            Technology::Ruby,
            BTreeSet::from([Group::Default]),
        );
        dependency.latest_version = Some("1.16.5".to_string());
        dependency.flags = RiskFlags {
            deprecated: false,
            outdated: true,
            vulnerable: true,
        };
        dependency.vulnerabilities = vec![VulnerabilityRecord::new("GHSA-xxxx", Severity::High)
            .with_summary("Heap overflow | in libxml2")
            .with_fixed_version("1.13.4")];
        dependency
    }

    #[test]
    fn test_markdown_package_table() {
        let response = AuditResponse::new(vec![report(vec![nokogiri()])], Vec::new());
        let output = MarkdownFormatter::new().format(&response).unwrap();

        assert!(output.starts_with("# Package Audit\n\n## ruby\n\n1 of 40 resolved package(s) reported."));
        assert!(output.contains(TABLE_HEADER));
        assert!(output.contains(
            "| [nokogiri](https://rubygems.org/gems/nokogiri) | 1.13.0 | N/A | 1.16.5 | N/A | outdated, vulnerable | high | default |"
        ));
        assert!(output.contains("- 2 package(s) missing registry metadata"));
    }

    #[test]
    fn test_markdown_advisories_are_escaped() {
        let response = AuditResponse::new(vec![report(vec![nokogiri()])], Vec::new());
        let output = MarkdownFormatter::new().format(&response).unwrap();

        assert!(output.contains("### ruby advisories"));
        assert!(output.contains(
            "| nokogiri | 1.13.0 | GHSA-xxxx | HIGH | 1.13.4 | Heap overflow \\| in libxml2 |"
        ));
    }

    #[test]
    fn test_markdown_removed_entries() {
        let removed = vec![RemovedEntry {
            technology: "node".to_string(),
            name: "lodash".to_string(),
            version: "4.16.0".to_string(),
            reason: RemovalReason::NoLongerExists,
        }];
        let response = AuditResponse::new(vec![report(Vec::new())], removed);
        let output = MarkdownFormatter::new().format(&response).unwrap();

        assert!(output.contains("*No risky packages found.*"));
        assert!(output.contains("## Removed ignore entries\n\n- lodash@4.16.0 (node)"));
    }
}
