use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::postgres::DecodeOptions;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// Type names returned verbatim, e.g. `["timestamptz", "_date"]`.
    #[serde(default)]
    pub skip_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Pretty-print each decoded change instead of one JSON object per line.
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::load(Some(path.as_ref()))
    }

    /// Layers an optional config file under `PG_TYPECAST__*` environment
    /// variables (e.g. `PG_TYPECAST__OUTPUT__PRETTY=true`).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("PG_TYPECAST")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("decoder.skip_types")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new().skip_types(self.decoder.skip_types.iter().map(String::as_str))
    }
}
