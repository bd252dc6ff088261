//! Neighbours command: adjacent tram stops and the termini beyond them.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wdbot_data::{RouteTypeFilter, TramNetwork};

use crate::{
    ARG_GTFS, ARG_ROUTE_TYPE, ARG_STOPS, CliError, ENV_GTFS, ENV_STOPS, require_file, write_json,
};

/// CLI arguments for the `neighbours` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "neighbours",
    long_about = "Load the PID stop list and a zipped GTFS feed, then print, \
                 for every tram stop, each adjacent stop together with the \
                 terminus reached by following the line past it.",
    about = "Derive tram stop neighbours and termini"
)]
#[ortho_config(prefix = "WDBOT")]
pub(crate) struct NeighboursArgs {
    /// Path to the PID stop-list JSON document.
    #[arg(long = ARG_STOPS, value_name = "path")]
    #[serde(default)]
    pub(crate) stops: Option<Utf8PathBuf>,
    /// Path to the zipped GTFS feed.
    #[arg(long = ARG_GTFS, value_name = "path")]
    #[serde(default)]
    pub(crate) gtfs: Option<Utf8PathBuf>,
    /// GTFS route types to follow (default 0, trams).
    #[arg(long = ARG_ROUTE_TYPE, value_name = "type", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) route_type: Option<Vec<String>>,
}

impl NeighboursArgs {
    pub(crate) fn into_config(self) -> Result<NeighboursConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NeighboursConfig::try_from(merged)
    }
}

/// Resolved `neighbours` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NeighboursConfig {
    pub(crate) stops: Utf8PathBuf,
    pub(crate) gtfs: Utf8PathBuf,
    pub(crate) filter: RouteTypeFilter,
}

impl NeighboursConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.stops, ARG_STOPS)?;
        require_file(&self.gtfs, ARG_GTFS)?;
        Ok(())
    }
}

impl TryFrom<NeighboursArgs> for NeighboursConfig {
    type Error = CliError;

    fn try_from(args: NeighboursArgs) -> Result<Self, Self::Error> {
        let stops = args.stops.ok_or(CliError::MissingArgument {
            field: ARG_STOPS,
            env: ENV_STOPS,
        })?;
        let gtfs = args.gtfs.ok_or(CliError::MissingArgument {
            field: ARG_GTFS,
            env: ENV_GTFS,
        })?;
        let filter = match args.route_type {
            None => RouteTypeFilter::default(),
            Some(types) if types.is_empty() => return Err(CliError::EmptyRouteTypes),
            Some(types) => RouteTypeFilter::new(types),
        };
        Ok(Self {
            stops,
            gtfs,
            filter,
        })
    }
}

pub(crate) fn load_network(config: &NeighboursConfig) -> Result<TramNetwork, CliError> {
    config.validate_sources()?;
    Ok(TramNetwork::load_filtered(
        &config.stops,
        &config.gtfs,
        &config.filter,
    )?)
}

pub(super) fn run_neighbours(args: NeighboursArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let network = load_network(&args.into_config()?)?;
    write_json(writer, network.neighbours())
}
