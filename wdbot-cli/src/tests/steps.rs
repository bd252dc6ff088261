//! Behaviour-driven step definitions driving the convert and neighbours
//! command scenarios.

use super::helpers::{DatasetFiles, output_json};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates CLI scenario state so each step only needs a single world
/// argument.
#[derive(Debug)]
struct CliWorld {
    dataset_files: RefCell<Option<DatasetFiles>>,
    cli_args: RefCell<Vec<String>>,
    cli_result: RefCell<Option<Result<Vec<u8>, CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            dataset_files: RefCell::new(None),
            cli_args: RefCell::new(Vec::new()),
            cli_result: RefCell::new(None),
        }
    }

    fn push_args<const N: usize>(&self, args: [String; N]) {
        self.cli_args.borrow_mut().extend(args);
    }

    fn with_files<T>(&self, read: impl FnOnce(&DatasetFiles) -> T) -> T {
        let guard = self.dataset_files.borrow();
        read(guard.as_ref().expect("dataset files prepared"))
    }

    fn run(&self, subcommand: &str) {
        let mut invocation = vec!["wdbot".to_owned(), subcommand.to_owned()];
        invocation.extend(self.cli_args.borrow().iter().cloned());
        let outcome = Cli::try_parse_from(invocation)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| {
                let mut output = Vec::new();
                dispatch(cli.command, &mut output).map(|()| output)
            });
        self.cli_result.replace(Some(outcome));
    }

    fn output(&self) -> serde_json::Value {
        let borrowed = self.cli_result.borrow();
        let output = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        output_json(output)
    }

    fn assert_missing(&self, flag: &str) {
        let borrowed = self.cli_result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        match error {
            CliError::MissingArgument { field, .. } => assert_eq!(*field, flag),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

#[given("I pass the Old Town coordinates with CLI flags")]
fn old_town_coordinates(#[from(world)] world: &CliWorld) {
    world.push_args([
        format!("--{ARG_Y}"),
        "-743000".to_owned(),
        format!("--{ARG_X}"),
        "-1043000".to_owned(),
    ]);
}

#[given("I pass only the Y coordinate")]
fn only_y(#[from(world)] world: &CliWorld) {
    world.push_args([format!("--{ARG_Y}"), "-743000".to_owned()]);
}

#[given("I pass a positive Y coordinate")]
fn positive_y(#[from(world)] world: &CliWorld) {
    world.push_args([
        format!("--{ARG_Y}"),
        "1".to_owned(),
        format!("--{ARG_X}"),
        "-1".to_owned(),
    ]);
}

#[given("a stop list and GTFS feed on disk")]
fn dataset_on_disk(#[from(world)] world: &CliWorld) {
    let files = DatasetFiles::new();
    assert!(files.stops().is_file(), "expected the stop list on disk");
    assert!(files.gtfs().is_file(), "expected the GTFS feed on disk");
    world.dataset_files.replace(Some(files));
}

#[given("I pass both input paths with CLI flags")]
fn both_paths(#[from(world)] world: &CliWorld) {
    let (stops, gtfs) = world.with_files(|files| {
        (files.stops().as_str().to_owned(), files.gtfs().as_str().to_owned())
    });
    world.push_args([
        format!("--{ARG_STOPS}"),
        stops,
        format!("--{ARG_GTFS}"),
        gtfs,
    ]);
}

#[given("I pass only the stop list path")]
fn only_stops(#[from(world)] world: &CliWorld) {
    let stops = world.with_files(|files| files.stops().as_str().to_owned());
    world.push_args([format!("--{ARG_STOPS}"), stops]);
}

#[given("I select route type 3")]
fn bus_routes(#[from(world)] world: &CliWorld) {
    world.push_args([format!("--{ARG_ROUTE_TYPE}"), "3".to_owned()]);
}

#[when("I run the convert command")]
fn run_convert_command(#[from(world)] world: &CliWorld) {
    world.run("convert");
}

#[when("I run the neighbours command")]
fn run_neighbours_command(#[from(world)] world: &CliWorld) {
    world.run("neighbours");
}

#[then("the output is the WGS-84 point 50.087, 14.419")]
fn output_point(#[from(world)] world: &CliWorld) {
    let value = world.output();
    let latitude = value["latitude"].as_f64().expect("latitude is a number");
    let longitude = value["longitude"].as_f64().expect("longitude is a number");
    assert!((latitude - 50.087).abs() < 1e-3, "latitude {latitude}");
    assert!((longitude - 14.419).abs() < 1e-3, "longitude {longitude}");
}

#[then("the CLI reports that the \"x\" flag is missing")]
fn reports_missing_x(#[from(world)] world: &CliWorld) {
    world.assert_missing(ARG_X);
}

#[then("the CLI reports that the \"gtfs\" flag is missing")]
fn reports_missing_gtfs(#[from(world)] world: &CliWorld) {
    world.assert_missing(ARG_GTFS);
}

#[then("the CLI reports a conversion failure")]
fn reports_conversion_failure(#[from(world)] world: &CliWorld) {
    let borrowed = world.cli_result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::Conversion(_)) => {}
        other => panic!("expected a conversion failure, found {:?}", other.as_ref().err()),
    }
}

#[then("Anděl neighbours Újezd towards Národní divadlo")]
fn andel_neighbours(#[from(world)] world: &CliWorld) {
    let value = world.output();
    assert_eq!(
        value["Anděl"],
        serde_json::json!([{ "neighbour": "Újezd", "terminus": "Národní divadlo" }])
    );
    assert!(value.get("Národní divadlo").is_none(), "the line ends there");
}

#[then("Národní divadlo neighbours Anděl towards Anděl")]
fn bus_neighbours(#[from(world)] world: &CliWorld) {
    let value = world.output();
    assert_eq!(
        value,
        serde_json::json!({
            "Národní divadlo": [{ "neighbour": "Anděl", "terminus": "Anděl" }]
        })
    );
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $path:literal, $scenario_title:literal) => {
        #[scenario(path = $path, name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(
    convert_flags,
    "tests/features/convert_command.feature",
    "converting a grid point given by CLI flags"
);
register_cli_scenario!(
    convert_missing_coordinate,
    "tests/features/convert_command.feature",
    "rejecting a missing coordinate"
);
register_cli_scenario!(
    convert_outside_quadrant,
    "tests/features/convert_command.feature",
    "rejecting coordinates outside the grid quadrant"
);
register_cli_scenario!(
    neighbours_of_line,
    "tests/features/neighbours_command.feature",
    "printing the neighbours of a tram line"
);
register_cli_scenario!(
    neighbours_other_route_types,
    "tests/features/neighbours_command.feature",
    "following other route types on request"
);
register_cli_scenario!(
    neighbours_missing_feed,
    "tests/features/neighbours_command.feature",
    "rejecting a missing GTFS feed"
);
