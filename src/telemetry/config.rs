use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub otel_enabled: bool,
    pub endpoint: String,
    pub headers: HashMap<String, String>,
    pub service_name: String,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otel_enabled: false,
            endpoint: "http://localhost:4318/v1/traces".to_string(),
            headers: HashMap::new(),
            service_name: "jmeter-executor".to_string(),
            default_filter: "jmeter_executor=info".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let otel_enabled = std::env::var("EXECUTOR_OTEL_ENABLED")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let endpoint =
            std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.endpoint);

        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name);

        let headers = std::env::var("OTEL_EXPORTER_OTLP_HEADERS")
            .map(|raw| parse_headers(&raw))
            .unwrap_or_default();

        Self {
            otel_enabled,
            endpoint,
            headers,
            service_name,
            default_filter: defaults.default_filter,
        }
    }
}

/// Parse `key=value,key2=value2`
fn parse_headers(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}
