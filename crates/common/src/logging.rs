use std::{env, sync::OnceLock};

use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub const OTLP_URL_ENVVAR: &str = "CHAINVIEW_OTLP_URL";
pub const SVC_LABEL_ENVVAR: &str = "CHAINVIEW_SVC_LABEL";

/// Provider behind the OTLP layer, shut down by [`finalize`].
static OTLP_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

#[derive(Debug)]
pub struct LoggerConfig {
    whoami: String,
    otel_url: Option<String>,
}

impl LoggerConfig {
    /// Creates a new empty instance with whoami set.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
        }
    }

    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(chainview)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Must be called from within a tokio runtime context if an OTLP url is set,
/// the batch exporter spawns onto it.
pub fn init(config: LoggerConfig) {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer().compact().with_filter(filt);

    // OpenTelemetry output.
    if let Some(otel_url) = &config.otel_url {
        let tp = install_otlp_provider(otel_url).expect("init: opentelemetry");
        let tt = tp.tracer("chainview-log");

        let otel_sub = tracing_opentelemetry::layer().with_tracer(tt);

        tracing_subscriber::registry()
            .with(stdout_sub)
            .with(otel_sub)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_sub).init();
    }

    info!(whoami = %config.whoami, "logging started");
}

/// Builds the batching OTLP pipeline and registers its provider globally.
fn install_otlp_provider(url: &str) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(url);

    let tp = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    opentelemetry::global::set_tracer_provider(tp.clone());
    if OTLP_PROVIDER.set(tp.clone()).is_err() {
        return Err(TraceError::Other("OTLP provider already installed".into()));
    }

    Ok(tp)
}

/// Shuts down the logging subsystem, flushing any pending spans.
pub fn finalize() {
    info!("shutting down logging");

    // The global slot only holds a clone, so the batch has to be flushed
    // through the provider itself.
    if let Some(tp) = OTLP_PROVIDER.get() {
        if let Err(err) = tp.shutdown() {
            warn!(%err, "failed to flush OTLP spans");
        }
    }
    opentelemetry::global::shutdown_tracer_provider();
}

/// Gets the OTLP URL from the standard envvar.
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    whoami_with_label(base, get_service_label_from_env().as_deref())
}

fn whoami_with_label(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_otlp_provider_is_kept_for_shutdown() {
        assert!(OTLP_PROVIDER.get().is_none());

        // the exporter connects lazily, no collector is needed
        install_otlp_provider("http://127.0.0.1:4317").unwrap();
        assert!(OTLP_PROVIDER.get().is_some());

        assert!(install_otlp_provider("http://127.0.0.1:4317").is_err());
    }

    #[test]
    fn test_whoami_label() {
        assert_eq!(whoami_with_label("chainview", None), "chainview");
        assert_eq!(
            whoami_with_label("chainview", Some("mainnet")),
            "chainview%mainnet"
        );
    }
}
