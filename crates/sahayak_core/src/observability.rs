//! Tracing and OpenTelemetry metrics initialization.

#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global};
#[cfg(feature = "metrics")]
use opentelemetry_otlp::{MetricExporter as OtlpExporter, WithExportConfig};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
#[cfg(feature = "metrics")]
use std::time::Duration;
#[cfg(feature = "metrics")]
use tracing::{info, warn};
use tracing::{debug, instrument};
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Reads `SAHAYAK_LOG_FORMAT`, falling back to [`LogFormat::Pretty`].
    pub fn from_env() -> Self {
        std::env::var("SAHAYAK_LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// twice returns an error from the second call and leaves the first
/// subscriber in place.
pub fn init_tracing(format: LogFormat) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    installed.map_err(|e| format!("Failed to install tracing subscriber: {}", e))?;
    debug!(?format, "Tracing subscriber installed");
    Ok(())
}

/// Where flow metrics are exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsExporter {
    /// Print batches to stdout
    Stdout,
    /// Push over OTLP/HTTP
    Otlp {
        /// Collector URL
        endpoint: String,
    },
}

impl MetricsExporter {
    /// Collector used when `OTEL_EXPORTER_OTLP_ENDPOINT` is unset.
    pub const DEFAULT_OTLP_ENDPOINT: &'static str = "http://localhost:4318";

    /// Reads `OTEL_EXPORTER` and `OTEL_EXPORTER_OTLP_ENDPOINT`.
    pub fn from_env() -> Self {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    /// Selects the exporter through an arbitrary variable lookup.
    ///
    /// `otlp` (any case) selects OTLP; anything else prints to stdout.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("OTEL_EXPORTER") {
            Some(kind) if kind.eq_ignore_ascii_case("otlp") => MetricsExporter::Otlp {
                endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                    .unwrap_or_else(|| Self::DEFAULT_OTLP_ENDPOINT.to_string()),
            },
            _ => MetricsExporter::Stdout,
        }
    }
}

#[cfg(feature = "metrics")]
static METER_PROVIDER: std::sync::OnceLock<SdkMeterProvider> = std::sync::OnceLock::new();

/// Registers the global meter provider that flow metrics report to.
///
/// A no-op without the `metrics` feature.
#[instrument(skip_all, fields(service_name))]
pub fn init_observability(
    service_name: &'static str,
    export_interval_secs: u64,
) -> Result<(), String> {
    #[cfg(not(feature = "metrics"))]
    {
        let _ = export_interval_secs;
        debug!(service_name, "Metrics disabled at build time");
        Ok(())
    }

    #[cfg(feature = "metrics")]
    {
        let interval = Duration::from_secs(export_interval_secs);
        let exporter = MetricsExporter::from_env();
        info!(service_name, ?exporter, export_interval_secs, "Initializing metrics");

        let reader = match &exporter {
            MetricsExporter::Otlp { endpoint } => {
                let otlp = OtlpExporter::builder()
                    .with_http()
                    .with_endpoint(endpoint)
                    .with_timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| {
                        warn!(error = %e, "OTLP exporter unavailable");
                        format!("Failed to create OTLP exporter: {}", e)
                    })?;
                PeriodicReader::builder(otlp).with_interval(interval).build()
            }
            MetricsExporter::Stdout => PeriodicReader::builder(StdoutExporter::default())
                .with_interval(interval)
                .build(),
        };

        let provider = SdkMeterProvider::builder()
            .with_resource(
                Resource::builder_empty()
                    .with_attributes([KeyValue::new("service.name", service_name)])
                    .build(),
            )
            .with_reader(reader)
            .build();

        global::set_meter_provider(provider.clone());
        if METER_PROVIDER.set(provider).is_err() {
            warn!("Meter provider already initialized; keeping the first");
        }
        Ok(())
    }
}

/// Flushes and stops the meter provider, if one was registered.
#[instrument]
pub fn shutdown_observability() {
    #[cfg(feature = "metrics")]
    if let Some(provider) = METER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            warn!(error = %e, "Metrics shutdown failed");
            return;
        }
    }
    debug!("Observability shut down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn exporter_defaults_to_stdout() {
        assert_eq!(MetricsExporter::from_vars(|_| None), MetricsExporter::Stdout);
        assert_eq!(
            MetricsExporter::from_vars(|_| Some("prometheus".to_string())),
            MetricsExporter::Stdout
        );
    }

    #[test]
    fn otlp_exporter_uses_configured_endpoint() {
        let default = MetricsExporter::from_vars(|var| {
            (var == "OTEL_EXPORTER").then(|| "OTLP".to_string())
        });
        assert_eq!(
            default,
            MetricsExporter::Otlp {
                endpoint: MetricsExporter::DEFAULT_OTLP_ENDPOINT.to_string()
            }
        );

        let custom = MetricsExporter::from_vars(|var| match var {
            "OTEL_EXPORTER" => Some("otlp".to_string()),
            _ => Some("http://collector:4318".to_string()),
        });
        assert_eq!(
            custom,
            MetricsExporter::Otlp {
                endpoint: "http://collector:4318".to_string()
            }
        );
    }
}
