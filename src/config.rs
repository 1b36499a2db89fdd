// Command-line and environment configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::chart::ChartKind;
use crate::data::Dataset;
use crate::error::Result;
use crate::filter::{FilterCriteria, RawCriteria};
use crate::{OutputFormat, RenderOptions};

pub const DEFAULT_MEMBERS_CSV: &str = "gym_members_exercise_tracking.csv";

#[derive(Parser, Debug)]
#[command(name = "gymstats")]
#[command(about = "Filter gym member data and chart summary statistics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the average calories and session count as JSON
    Summary {
        #[command(flatten)]
        data: DatasetArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Render one chart to a file, or to stdout when no file is given
    Chart {
        /// Chart name, e.g. bmi_distribution
        #[arg(value_parser = parse_chart_kind)]
        kind: ChartKind,
        #[command(flatten)]
        data: DatasetArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        render: RenderArgs,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Gym members CSV
    #[arg(long, env = "GYMSTATS_MEMBERS", default_value = DEFAULT_MEMBERS_CSV)]
    pub members: PathBuf,
    /// Exercise catalog CSV
    #[arg(long, env = "GYMSTATS_EXERCISES")]
    pub exercises: Option<PathBuf>,
}

impl DatasetArgs {
    pub fn load(&self) -> Result<Dataset> {
        Dataset::load(&self.members, self.exercises.as_deref())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub workout_type: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        FilterCriteria::parse(&RawCriteria {
            age: self.age.clone(),
            gender: self.gender.clone(),
            workout_type: self.workout_type.clone(),
        })
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// png or svg
    #[arg(long, value_parser = parse_format, default_value = "png")]
    pub format: OutputFormat,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
}

impl RenderArgs {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "GYMSTATS_HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "GYMSTATS_PORT", default_value_t = 8080)]
    pub port: u16,
    #[command(flatten)]
    pub data: DatasetArgs,
}

fn parse_chart_kind(s: &str) -> std::result::Result<ChartKind, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_command() {
        let cli = Cli::try_parse_from([
            "gymstats",
            "chart",
            "fat_vs_calories",
            "--members",
            "m.csv",
            "--age",
            "25",
            "--format",
            "svg",
            "-o",
            "out.svg",
        ])
        .unwrap();

        match cli.command {
            Command::Chart { kind, data, filter, render, output } => {
                assert_eq!(kind, ChartKind::FatVsCalories);
                assert_eq!(data.members, PathBuf::from("m.csv"));
                assert_eq!(filter.criteria().unwrap(), FilterCriteria::new().age(25));
                assert_eq!(render.options().format, OutputFormat::Svg);
                assert_eq!(output, Some(PathBuf::from("out.svg")));
            }
            other => panic!("Expected Chart command, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_chart_is_rejected() {
        let result = Cli::try_parse_from(["gymstats", "chart", "radar", "--members", "m.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_address() {
        let cli = Cli::try_parse_from([
            "gymstats", "serve", "--host", "0.0.0.0", "--port", "9000", "--members", "m.csv",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.host, "0.0.0.0");
                assert_eq!(args.port, 9000);
                assert_eq!(args.data.exercises, None);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }
}
