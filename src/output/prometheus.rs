//! Prometheus textfile collector output
//!
//! One gauge sample per checked dependency; the value is the severity code
//! (0 = current ... 5 = critical).

use crate::domain::Stack;
use crate::output::{row, OutputFormatter};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::io::{Error, ErrorKind, Write};

/// Metric name
pub const METRIC_NAME: &str = "stackver_service_status";

const METRIC_HELP: &str = "Dependency freshness and end-of-life status (0=current, 1=good, 2=update-available, 3=warning, 4=danger, 5=critical)";

/// Label names, in the column order of the table row
const LABELS: [&str; 6] = ["name", "version", "latest", "eol_date", "status", "link"];

/// Prometheus formatter
pub struct PrometheusFormatter;

fn to_io_error(e: prometheus::Error) -> Error {
    Error::new(ErrorKind::InvalidData, e)
}

impl PrometheusFormatter {
    /// Build a registry holding one gauge sample per checked dependency
    fn registry(stack: &Stack) -> prometheus::Result<Registry> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &LABELS)?;
        registry.register(Box::new(gauge.clone()))?;

        for dependency in stack.dependencies() {
            let Some(status) = &dependency.status else {
                continue;
            };
            let values = row(dependency);
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            gauge
                .get_metric_with_label_values(&values)?
                .set(f64::from(status.severity.code()));
        }
        Ok(registry)
    }
}

impl OutputFormatter for PrometheusFormatter {
    fn format(&self, stack: &Stack, writer: &mut dyn Write) -> std::io::Result<()> {
        let registry = Self::registry(stack).map_err(to_io_error)?;
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .map_err(to_io_error)?;
        writer.write_all(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, Severity, StackConfig, Status, TrackerSpec};
    use crate::output::fixtures::checked_stack;

    fn render(stack: &Stack) -> String {
        let mut out = Vec::new();
        PrometheusFormatter.format(stack, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_line<'a>(text: &'a str, name: &str) -> &'a str {
        let label = format!("name=\"{}\"", name);
        text.lines()
            .find(|line| line.starts_with(METRIC_NAME) && line.contains(&label))
            .unwrap()
    }

    #[test]
    fn test_prometheus_output() {
        let text = render(&checked_stack());

        assert!(text.contains("# HELP stackver_service_status Dependency freshness"));
        assert!(text.contains("# TYPE stackver_service_status gauge"));

        let nginx = sample_line(&text, "nginx");
        assert!(nginx.contains(r#"version="1.25.3""#));
        assert!(nginx.contains(r#"latest="1.27.0""#));
        assert!(nginx.contains(r#"eol_date="unknown""#));
        assert!(nginx.contains(r#"status="update-available""#));
        assert!(nginx.contains(r#"link="https://github.com/nginx/nginx/releases""#));
        assert!(nginx.ends_with("} 2"));

        let postgres = sample_line(&text, "postgresql");
        assert!(postgres.contains(r#"eol_date="2024-11-14""#));
        assert!(postgres.ends_with("} 4"));
    }

    #[test]
    fn test_label_values_are_escaped() {
        let mut dep = Dependency::new("odd", TrackerSpec::default()).with_version("1.0");
        dep.status = Some(Status {
            latest_version: "2.0".to_string(),
            eol_date: None,
            link: r#"https://example.com/"quoted"\path"#.to_string(),
            severity: Severity::Critical,
        });
        let text = render(&Stack::new(StackConfig::default(), vec![dep]));

        let line = sample_line(&text, "odd");
        assert!(line.contains(r#"link="https://example.com/\"quoted\"\\path""#));
        assert!(line.ends_with("} 5"));
    }

    #[test]
    fn test_unchecked_dependencies_are_skipped() {
        let dep = Dependency::new("pending", TrackerSpec::default());
        let text = render(&Stack::new(StackConfig::default(), vec![dep]));
        assert!(!text.contains("pending"));
    }
}
