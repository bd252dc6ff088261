//! Command-line interface for wdbot's offline tooling.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

mod cadastre;
mod convert;
mod error;
mod neighbours;

use cadastre::{CadastreArgs, run_cadastre};
use convert::{ConvertArgs, run_convert};
pub use error::CliError;
use neighbours::{NeighboursArgs, run_neighbours};

pub(crate) const ARG_Y: &str = "y";
pub(crate) const ARG_X: &str = "x";
pub(crate) const ARG_HEIGHT: &str = "height";
pub(crate) const ARG_DUMP: &str = "dump";
pub(crate) const ARG_STOPS: &str = "stops";
pub(crate) const ARG_GTFS: &str = "gtfs";
pub(crate) const ARG_ROUTE_TYPE: &str = "route-type";
pub(crate) const ENV_Y: &str = "WDBOT_CMDS_CONVERT_Y";
pub(crate) const ENV_X: &str = "WDBOT_CMDS_CONVERT_X";
pub(crate) const ENV_DUMP: &str = "WDBOT_CMDS_CADASTRE_DUMP";
pub(crate) const ENV_STOPS: &str = "WDBOT_CMDS_NEIGHBOURS_STOPS";
pub(crate) const ENV_GTFS: &str = "WDBOT_CMDS_NEIGHBOURS_GTFS";

/// Run the wdbot CLI with the current process arguments and environment.
///
/// Command output is written to standard output as pretty-printed JSON.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Convert(args) => run_convert(args, writer),
        Command::Cadastre(args) => run_cadastre(args, writer),
        Command::Neighbours(args) => run_neighbours(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wdbot",
    about = "Prepare Czech geodata and Prague tram facts for knowledge-base edits",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one S-JTSK grid point to WGS-84.
    Convert(ConvertArgs),
    /// Convert every definition point of a RÚIAN cadastral dump.
    Cadastre(CadastreArgs),
    /// Derive tram stop neighbours and termini from a GTFS feed.
    Neighbours(NeighboursArgs),
}

/// Write `value` to `writer` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Fail with [`CliError::MissingSourceFile`] unless `path` is a regular file.
pub(crate) fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests;
