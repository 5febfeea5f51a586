//! CSV output formatter

use crate::domain::Stack;
use crate::output::{row, OutputFormatter, COLUMNS};
use std::io::Write;

/// CSV formatter (RFC 4180 quoting)
pub struct CsvFormatter;

/// Quote a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record<S: AsRef<str>>(writer: &mut dyn Write, fields: &[S]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(writer, "{}", line.join(","))
}

impl OutputFormatter for CsvFormatter {
    fn format(&self, stack: &Stack, writer: &mut dyn Write) -> std::io::Result<()> {
        write_record(writer, &COLUMNS[..])?;
        for dependency in stack.dependencies() {
            write_record(writer, &row(dependency)[..])?;
        }
        Ok(())
    }
}
