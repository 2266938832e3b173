/// Formatter adapters for the audit report output formats
mod cells;
mod csv_formatter;
mod json_formatter;
mod markdown_formatter;
mod table_formatter;

pub use csv_formatter::CsvFormatter;
pub use json_formatter::JsonFormatter;
pub use markdown_formatter::MarkdownFormatter;
pub use table_formatter::TableFormatter;
