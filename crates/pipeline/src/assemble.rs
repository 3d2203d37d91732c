//! Pipeline assembly from declarative configuration
//!
//! Turns `[sinks.<name>]` declarations into live sinks on a
//! [`PipelineBuilder`]. File sinks become threaded [`Sink`]s; HTTP sinks
//! become [`AsyncSink`]s with their endpoint and key filled from credential
//! resolution when the declaration omits them. Hooks are code, not config;
//! the caller registers them on the returned builder.
//!
//! [`Sink`]: beacon_sinks::Sink
//! [`AsyncSink`]: beacon_sinks::AsyncSink

use beacon_config::{Config, ConfigError, Credentials, SinkSpec};
use beacon_sinks::{
    AsyncSink, DeliveryMode, HttpTransport, LineFileConfig, LineFileSink, Sink, TabularFileConfig,
    TabularFileSink,
};

use crate::PipelineBuilder;

#[cfg(test)]
#[path = "assemble_test.rs"]
mod assemble_test;

/// Build sinks for every declaration in `config`
///
/// Disabled declarations still construct their sink (the pipeline skips
/// them at fan-out), so enabling one later needs no reassembly. An HTTP
/// declaration with no endpoint from either the spec or `credentials` is
/// rejected.
pub fn from_config(
    config: &Config,
    credentials: Option<&Credentials>,
) -> Result<PipelineBuilder, ConfigError> {
    let mut builder = PipelineBuilder::new();

    for (name, spec) in &config.sinks {
        let sink_config = spec.common().sink_config(name);
        match spec {
            SinkSpec::LineFile(spec) => {
                let transport = LineFileSink::new(
                    LineFileConfig::new(spec.file.path_policy())
                        .with_extension(spec.extension.clone()),
                );
                builder = builder.sink(Sink::new(sink_config, Box::new(transport)));
            }
            SinkSpec::TabularFile(spec) => {
                // Tabular rows only reach disk at batch checkpoints, so an
                // unbatched declaration would buffer the whole session.
                let sink_config = match sink_config.mode {
                    DeliveryMode::Single => sink_config.with_batching(None),
                    DeliveryMode::Batch { .. } => sink_config,
                };
                let transport = TabularFileSink::new(
                    TabularFileConfig::new(spec.file.path_policy())
                        .with_filter(spec.column_filter()?)
                        .with_flatten(spec.flatten),
                );
                builder = builder.sink(Sink::new(sink_config, Box::new(transport)));
            }
            SinkSpec::Http(spec) => {
                let http_config = spec.http_config(credentials);
                if http_config.endpoint.is_empty() {
                    return Err(ConfigError::Sink {
                        name: name.clone(),
                        reason: "no endpoint declared or resolved".to_string(),
                    });
                }
                let transport =
                    HttpTransport::new(http_config).map_err(|err| ConfigError::Sink {
                        name: name.clone(),
                        reason: err.to_string(),
                    })?;
                builder = builder
                    .async_sink(AsyncSink::new(sink_config, std::sync::Arc::new(transport)));
            }
        }
        tracing::debug!(sink = %name, "sink assembled");
    }

    Ok(builder)
}
