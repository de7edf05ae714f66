use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Unknown database engine: {0}")]
	UnknownEngine(String),

	#[error("Invalid value for {key}: {value}")]
	InvalidValue { key: String, value: String },
}
