//! endoflife.date tracker
//!
//! Fetches release cycles for a product and finds the cycle owning the
//! current version to determine its end-of-life date.
//! API endpoint: https://endoflife.date/api/{product}.json

use super::{HttpClient, RequestOptions, Resolution, ResolveOptions};
use crate::error::TrackerError;
use crate::version::cycle_contains_version;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Human-facing site used for links
const ENDOFLIFE_SITE_URL: &str = "https://endoflife.date";

/// One release cycle as returned by the API
#[derive(Debug, Deserialize)]
struct CycleRecord {
    #[serde(default)]
    cycle: Value,
    #[serde(default)]
    latest: Value,
    #[serde(default)]
    eol: Value,
}

/// endoflife.date tracker
pub struct EndOfLifeTracker {
    client: HttpClient,
    api_base: String,
    product: String,
}

impl EndOfLifeTracker {
    /// Tracker name used in errors and logs
    pub const NAME: &'static str = "endoflife.date";

    /// Create a new tracker for a product
    pub fn new(client: HttpClient, api_base: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            product: product.into(),
        }
    }

    fn build_url(&self) -> String {
        format!("{}/{}.json", self.api_base.trim_end_matches('/'), self.product)
    }

    /// Resolve the latest release and the current cycle's EOL date.
    ///
    /// Offset and prerelease settings do not apply here: the API already
    /// reports one latest release per product.
    pub async fn resolve(
        &self,
        current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        let url = self.build_url();
        let cycles: Vec<CycleRecord> = self
            .client
            .get_json(&url, &RequestOptions::default(), Self::NAME)
            .await?;

        let first = cycles
            .first()
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.product, "no release cycles"))?;
        let latest_version = value_to_string(&first.latest);

        let mut eol_date = None;
        for record in &cycles {
            let cycle = value_to_string(&record.cycle);
            if cycle_contains_version(&cycle, current) {
                // Later matches overwrite earlier ones.
                eol_date = parse_eol(&record.eol, options.today);
                debug!(product = %self.product, cycle = %cycle, current = %current, "matched release cycle");
            }
        }

        Ok(Resolution {
            latest_version,
            link: format!("{}/{}", ENDOFLIFE_SITE_URL, self.product),
            eol_date,
        })
    }
}

/// Cycle and version fields are strings but occasionally numbers
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Interpret the `eol` field: `true` means already EOL, `false` means none
fn parse_eol(value: &Value, today: NaiveDate) -> Option<NaiveDate> {
    match value {
        Value::Bool(true) => Some(today),
        Value::String(s) => match s.trim() {
            "true" => Some(today),
            "false" | "" => None,
            date => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NGINX_CYCLES: &str = r#"[
        {"cycle": "1.27", "latest": "1.27.1", "eol": false},
        {"cycle": "1.26", "latest": "1.26.2", "eol": "2025-04-23"},
        {"cycle": "1.25", "latest": "1.25.5", "eol": true}
    ]"#;

    fn options() -> ResolveOptions {
        ResolveOptions::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    async fn tracker_with_body(body: &str) -> (mockito::ServerGuard, mockito::Mock, EndOfLifeTracker) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/nginx.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let tracker = EndOfLifeTracker::new(HttpClient::new().unwrap(), server.url(), "nginx");
        (server, mock, tracker)
    }

    #[test]
    fn test_parse_eol_variants() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_eol(&Value::Bool(true), today), Some(today));
        assert_eq!(parse_eol(&Value::Bool(false), today), None);
        assert_eq!(parse_eol(&Value::String("true".into()), today), Some(today));
        assert_eq!(
            parse_eol(&Value::String("2025-04-23".into()), today),
            NaiveDate::from_ymd_opt(2025, 4, 23)
        );
        assert_eq!(parse_eol(&Value::String("soon".into()), today), None);
        assert_eq!(parse_eol(&Value::Null, today), None);
    }

    #[test]
    fn test_value_to_string_handles_numbers() {
        assert_eq!(value_to_string(&serde_json::json!(3.9)), "3.9");
        assert_eq!(value_to_string(&serde_json::json!("22.04")), "22.04");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[tokio::test]
    async fn test_resolve_with_dated_cycle() {
        let (_server, mock, tracker) = tracker_with_body(NGINX_CYCLES).await;
        let res = tracker.resolve("1.26.1", &options()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.latest_version, "1.27.1");
        assert_eq!(res.link, "https://endoflife.date/nginx");
        assert_eq!(res.eol_date, NaiveDate::from_ymd_opt(2025, 4, 23));
    }

    #[tokio::test]
    async fn test_resolve_supported_cycle_has_no_eol() {
        let (_server, _mock, tracker) = tracker_with_body(NGINX_CYCLES).await;
        let res = tracker.resolve("1.27.1", &options()).await.unwrap();
        assert_eq!(res.eol_date, None);
    }

    #[tokio::test]
    async fn test_resolve_boolean_eol_is_today() {
        let (_server, _mock, tracker) = tracker_with_body(
            r#"[{"cycle": "2.0", "latest": "2.0.3", "eol": false},
                {"cycle": "1.0", "latest": "1.0.9", "eol": true}]"#,
        )
        .await;
        let res = tracker.resolve("1.0.4", &options()).await.unwrap();
        assert_eq!(res.eol_date, Some(options().today));
    }

    #[tokio::test]
    async fn test_resolve_without_current_version() {
        let (_server, _mock, tracker) = tracker_with_body(NGINX_CYCLES).await;
        let res = tracker.resolve("", &options()).await.unwrap();
        assert_eq!(res.latest_version, "1.27.1");
        assert_eq!(res.eol_date, None);
    }

    #[tokio::test]
    async fn test_resolve_empty_list_is_not_found() {
        let (_server, _mock, tracker) = tracker_with_body("[]").await;
        let err = tracker.resolve("1.0", &options()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_http_error_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/unknown.json")
            .with_status(404)
            .create_async()
            .await;
        let tracker = EndOfLifeTracker::new(HttpClient::new().unwrap(), server.url(), "unknown");
        let err = tracker.resolve("1.0", &options()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Fetch { .. }));
    }
}
