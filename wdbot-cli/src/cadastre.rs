//! Cadastre command: definition points of a RÚIAN dump in WGS-84.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wdbot_data::{CadastralPoints, DEFAULT_HEIGHT, open_cadastral_points};

use crate::{ARG_DUMP, ARG_HEIGHT, CliError, ENV_DUMP, require_file, write_json};

/// CLI arguments for the `cadastre` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "cadastre",
    long_about = "Read a zipped RÚIAN cadastral-area dump (ST_UKSG) and print \
                 the WGS-84 definition point of every area keyed by its code. \
                 Areas whose point cannot be converted are skipped with a \
                 warning.",
    about = "Convert RÚIAN cadastral definition points to WGS-84"
)]
#[ortho_config(prefix = "WDBOT")]
pub(crate) struct CadastreArgs {
    /// Path to the zipped RÚIAN XML dump.
    #[arg(long = ARG_DUMP, value_name = "path")]
    #[serde(default)]
    pub(crate) dump: Option<Utf8PathBuf>,
    /// Height above the Bessel ellipsoid in metres (default 200).
    #[arg(long = ARG_HEIGHT, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) height: Option<f64>,
}

impl CadastreArgs {
    pub(crate) fn into_config(self) -> Result<CadastreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CadastreConfig::try_from(merged)
    }
}

/// Resolved `cadastre` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CadastreConfig {
    pub(crate) dump: Utf8PathBuf,
    pub(crate) height: f64,
}

impl CadastreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.dump, ARG_DUMP)
    }
}

impl TryFrom<CadastreArgs> for CadastreConfig {
    type Error = CliError;

    fn try_from(args: CadastreArgs) -> Result<Self, Self::Error> {
        let dump = args.dump.ok_or(CliError::MissingArgument {
            field: ARG_DUMP,
            env: ENV_DUMP,
        })?;
        Ok(Self {
            dump,
            height: args.height.unwrap_or(DEFAULT_HEIGHT),
        })
    }
}

pub(crate) fn read_cadastre(config: &CadastreConfig) -> Result<CadastralPoints, CliError> {
    config.validate_sources()?;
    let points = open_cadastral_points(&config.dump, config.height).map_err(|source| {
        CliError::Cadastre {
            path: config.dump.clone(),
            source: Box::new(source),
        }
    })?;
    match points.date {
        Some(date) => info!("Read {} cadastral areas dated {date}", points.points.len()),
        None => info!("Read {} undated cadastral areas", points.points.len()),
    }
    Ok(points)
}

pub(super) fn run_cadastre(args: CadastreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let points = read_cadastre(&args.into_config()?)?;
    write_json(writer, &points.points)
}
