//! Error types emitted by the wdbot CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wdbot_core::ConversionError;
use wdbot_data::{NetworkError, RuianError};

/// Errors emitted by the wdbot CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// `--route-type` was given without any value.
    #[error("at least one route type is required")]
    EmptyRouteTypes,
    /// The coordinates could not be converted.
    #[error("failed to convert coordinates: {0}")]
    Conversion(#[from] ConversionError),
    /// The cadastral dump could not be read.
    #[error("failed to read cadastral dump at {path:?}: {source}")]
    Cadastre {
        path: Utf8PathBuf,
        #[source]
        source: Box<RuianError>,
    },
    /// The tram network could not be loaded.
    #[error("failed to load tram network: {0}")]
    Network(#[source] Box<NetworkError>),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<NetworkError> for CliError {
    fn from(source: NetworkError) -> Self {
        Self::Network(Box::new(source))
    }
}
