//! JSON and YAML renderings of the checked stack document

use crate::domain::Stack;
use crate::output::OutputFormatter;
use std::io::{Error, ErrorKind, Write};

/// Serialization for the document formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Json,
    Yaml,
}

/// Writes the whole stack, statuses included
pub struct DocumentFormatter {
    kind: DocumentKind,
}

impl DocumentFormatter {
    /// Create a new document formatter
    pub fn new(kind: DocumentKind) -> Self {
        Self { kind }
    }
}

impl OutputFormatter for DocumentFormatter {
    fn format(&self, stack: &Stack, writer: &mut dyn Write) -> std::io::Result<()> {
        match self.kind {
            DocumentKind::Json => {
                let json = serde_json::to_string_pretty(stack)
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
                writeln!(writer, "{}", json)
            }
            DocumentKind::Yaml => {
                let yaml = serde_yaml::to_string(stack)
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
                writeln!(writer, "---")?;
                write!(writer, "{}", yaml)
            }
        }
    }
}
