use crate::adapters::outbound::formatters::{
    CsvFormatter, JsonFormatter, MarkdownFormatter, TableFormatter,
};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::ReportFormatter;

/// Rendering switches that only some formats honor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatterOptions {
    /// ANSI colors in the table format
    pub colored: bool,
    /// Header row in the CSV format
    pub csv_headers: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            colored: false,
            csv_headers: true,
        }
    }
}

/// Factory for creating report formatters
///
/// Keeps the selection of formatter adapters out of `main`.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter for the given output format
    ///
    /// # Examples
    /// ```
    /// use package_audit::application::dto::OutputFormat;
    /// use package_audit::application::factories::{FormatterFactory, FormatterOptions};
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json, FormatterOptions::default());
    /// ```
    pub fn create(format: OutputFormat, options: FormatterOptions) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Table => Box::new(TableFormatter::new().with_color(options.colored)),
            OutputFormat::Markdown => Box::new(MarkdownFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Csv => Box::new(CsvFormatter::new().with_headers(options.csv_headers)),
        }
    }

    /// Returns the progress message for the given output format
    ///
    /// # Examples
    /// ```
    /// use package_audit::application::dto::OutputFormat;
    /// use package_audit::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Json);
    /// assert_eq!(message, "📝 Rendering JSON report...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Table => "📝 Rendering table report...",
            OutputFormat::Markdown => "📝 Rendering Markdown report...",
            OutputFormat::Json => "📝 Rendering JSON report...",
            OutputFormat::Csv => "📝 Rendering CSV report...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::AuditResponse;

    #[test]
    fn test_each_format_renders_empty_response() {
        let response = AuditResponse::new(Vec::new(), Vec::new());

        let table = FormatterFactory::create(OutputFormat::Table, FormatterOptions::default())
            .format(&response)
            .unwrap();
        assert_eq!(table, "No risky packages found\n");

        let markdown = FormatterFactory::create(OutputFormat::Markdown, FormatterOptions::default())
            .format(&response)
            .unwrap();
        assert!(markdown.starts_with("# Package Audit"));

        let json = FormatterFactory::create(OutputFormat::Json, FormatterOptions::default())
            .format(&response)
            .unwrap();
        assert!(json.contains("\"has_risks\": false"));
    }

    #[test]
    fn test_csv_headers_option() {
        let response = AuditResponse::new(Vec::new(), Vec::new());

        let with_headers = FormatterFactory::create(OutputFormat::Csv, FormatterOptions::default())
            .format(&response)
            .unwrap();
        assert!(with_headers.starts_with("technology,name,version"));

        let options = FormatterOptions {
            csv_headers: false,
            ..Default::default()
        };
        let without_headers = FormatterFactory::create(OutputFormat::Csv, options)
            .format(&response)
            .unwrap();
        assert!(without_headers.is_empty());
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Table),
            "📝 Rendering table report..."
        );
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Markdown),
            "📝 Rendering Markdown report..."
        );
    }
}
