//! Convert command: one S-JTSK point to WGS-84.

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wdbot_core::{GeodeticPoint, ProjectedPoint};
use wdbot_data::DEFAULT_HEIGHT;

use crate::{ARG_HEIGHT, ARG_X, ARG_Y, CliError, ENV_X, ENV_Y, write_json};

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "convert",
    long_about = "Convert a point in the S-JTSK / Krovak East North grid \
                 (EPSG:5514) to WGS-84 latitude, longitude and height. Both \
                 grid coordinates are negative on Czech territory.",
    about = "Convert one S-JTSK grid point to WGS-84"
)]
#[ortho_config(prefix = "WDBOT")]
pub(crate) struct ConvertArgs {
    /// Grid Y coordinate in metres.
    #[arg(long = ARG_Y, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) y: Option<f64>,
    /// Grid X coordinate in metres.
    #[arg(long = ARG_X, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) x: Option<f64>,
    /// Height above the Bessel ellipsoid in metres (default 200).
    #[arg(long = ARG_HEIGHT, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) height: Option<f64>,
}

impl ConvertArgs {
    pub(crate) fn into_config(self) -> Result<ConvertConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ConvertConfig::try_from(merged)
    }
}

/// Resolved `convert` command configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConvertConfig {
    pub(crate) point: ProjectedPoint,
    pub(crate) height: f64,
}

impl TryFrom<ConvertArgs> for ConvertConfig {
    type Error = CliError;

    fn try_from(args: ConvertArgs) -> Result<Self, Self::Error> {
        let y = args.y.ok_or(CliError::MissingArgument {
            field: ARG_Y,
            env: ENV_Y,
        })?;
        let x = args.x.ok_or(CliError::MissingArgument {
            field: ARG_X,
            env: ENV_X,
        })?;
        Ok(Self {
            point: ProjectedPoint::new(y, x),
            height: args.height.unwrap_or(DEFAULT_HEIGHT),
        })
    }
}

pub(crate) fn convert(config: ConvertConfig) -> Result<GeodeticPoint, CliError> {
    Ok(config.point.to_wgs84(config.height)?)
}

pub(super) fn run_convert(args: ConvertArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let point = convert(args.into_config()?)?;
    write_json(writer, &point)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ConvertConfig, CliError> {
    let merged = ConvertArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ConvertConfig::try_from(merged)
}
