use super::cells;
use crate::application::dto::{AuditResponse, TechnologyReport};
use crate::audit::domain::{Dependency, RiskLevel};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use owo_colors::OwoColorize;

const HEADERS: [&str; 8] = [
    "Package",
    "Version",
    "Released",
    "Latest",
    "Latest Released",
    "Risks",
    "Level",
    "Vulnerabilities",
];

/// TableFormatter adapter rendering aligned plain-text tables for the terminal
pub struct TableFormatter {
    colored: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self { colored: false }
    }

    /// Highlights the risk level column with ANSI colors.
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn row(dependency: &Dependency) -> [String; 8] {
        [
            dependency.name.clone(),
            dependency.resolved_version.clone(),
            cells::date(dependency.version_date),
            cells::latest_version(dependency).to_string(),
            cells::date(dependency.latest_version_date),
            cells::risks(&dependency.flags),
            dependency.risk_level().as_str().to_string(),
            cells::vulnerabilities(dependency),
        ]
    }

    fn paint_level(&self, padded: String, level: RiskLevel) -> String {
        if !self.colored {
            return padded;
        }
        let painted = match level {
            RiskLevel::High => format!("{}", padded.red().bold()),
            RiskLevel::Medium => format!("{}", padded.yellow()),
            RiskLevel::Low => format!("{}", padded.cyan()),
            RiskLevel::None => padded.clone(),
        };
        painted
    }

    fn render_section(&self, output: &mut String, report: &TechnologyReport) {
        output.push_str(&format!(
            "{} ({} of {} packages)\n",
            report.technology,
            report.packages.len(),
            report.total_count
        ));

        if report.packages.is_empty() {
            output.push_str("  No risky packages found\n");
        } else {
            let rows: Vec<[String; 8]> = report.packages.iter().map(Self::row).collect();
            let mut widths = HEADERS.map(|h| h.chars().count());
            for row in &rows {
                for (width, cell) in widths.iter_mut().zip(row.iter()) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let header: Vec<String> = HEADERS
                .iter()
                .zip(widths.iter())
                .map(|(h, w)| format!("{:<w$}", h, w = w))
                .collect();
            output.push_str(&format!("  {}\n", header.join("  ").trim_end()));
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            output.push_str(&format!("  {}\n", rule.join("  ")));

            for (row, dependency) in rows.iter().zip(report.packages.iter()) {
                let line: Vec<String> = row
                    .iter()
                    .zip(widths.iter())
                    .enumerate()
                    .map(|(column, (cell, w))| {
                        let padded = format!("{:<w$}", cell, w = w);
                        if column == 6 {
                            self.paint_level(padded, dependency.risk_level())
                        } else {
                            padded
                        }
                    })
                    .collect();
                output.push_str(&format!("  {}\n", line.join("  ").trim_end()));
            }
        }

        if report.ignored_count > 0 {
            output.push_str(&format!(
                "  {} package(s) hidden by the ignore file\n",
                report.ignored_count
            ));
        }
        if report.degraded_count > 0 {
            output.push_str(&format!(
                "  {} package(s) missing registry metadata\n",
                report.degraded_count
            ));
        }
        output.push('\n');
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TableFormatter {
    fn format(&self, response: &AuditResponse) -> Result<String> {
        let mut output = String::new();
        for report in &response.reports {
            self.render_section(&mut output, report);
        }

        if response.has_risks() {
            output.push_str(&format!(
                "{} risky package(s) found\n",
                response.package_count()
            ));
        } else {
            output.push_str("No risky packages found\n");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{Group, RiskFlags, Technology};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn lodash() -> Dependency {
        let mut dependency = Dependency::new(
            "lodash",
            "4.17.0",
            "4.17.0",
            Technology::Node,
            BTreeSet::from([Group::Default]),
        );
        dependency.version_date = NaiveDate::from_ymd_opt(2016, 12, 31);
        dependency.latest_version = Some("4.17.21".to_string());
        dependency.latest_version_date = NaiveDate::from_ymd_opt(2021, 2, 20);
        dependency.flags = RiskFlags {
            deprecated: true,
            outdated: true,
            vulnerable: false,
        };
        dependency
    }

    fn response(packages: Vec<Dependency>) -> AuditResponse {
        AuditResponse::new(
            vec![TechnologyReport {
                technology: Technology::Node,
                total_count: 12,
                ignored_count: 1,
                degraded_count: 0,
                packages,
            }],
            Vec::new(),
        )
    }

    #[test]
    fn test_table_rows_are_aligned() {
        let output = TableFormatter::new().format(&response(vec![lodash()])).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "node (1 of 12 packages)");
        assert!(lines[1].trim_start().starts_with("Package"));
        let row = lines[3];
        assert!(row.contains("lodash"));
        assert!(row.contains("2016-12-31"));
        assert!(row.contains("4.17.21"));
        assert!(row.contains("deprecated, outdated"));
        assert!(row.contains("medium"));
        assert_eq!(
            lines[1].find("Version").unwrap(),
            row.find("4.17.0").unwrap()
        );
        assert!(output.contains("1 package(s) hidden by the ignore file"));
        assert!(output.ends_with("1 risky package(s) found\n"));
    }

    #[test]
    fn test_unknown_values_render_na() {
        let mut dependency = lodash();
        dependency.version_date = None;
        dependency.latest_version = None;
        dependency.latest_version_date = None;

        let output = TableFormatter::new()
            .format(&response(vec![dependency]))
            .unwrap();
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_empty_report() {
        let output = TableFormatter::new().format(&response(Vec::new())).unwrap();
        assert!(output.contains("  No risky packages found"));
        assert!(output.ends_with("No risky packages found\n"));
    }
}
