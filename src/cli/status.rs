use std::{path::PathBuf, process};

use clap::Parser;
use coursework::{Project, ProjectError, ValidCourse};
use tracing::instrument;

use super::{
    terminal::{paint, Tone},
    validate::print_diagnostics,
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show unit and lesson counts for the course")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::open(root);

        let course = match project.load_valid() {
            Ok(course) => course,
            Err(ProjectError::Invalid(diagnostics)) => {
                let headline = format!(
                    "✗ {} has {} problems",
                    project.manifest_path().display(),
                    diagnostics.len()
                );
                println!("{}", paint(&headline, Tone::Problem));
                print_diagnostics(&diagnostics);
                println!("\n{}", paint("Run 'course validate' for details", Tone::Muted));
                process::exit(2);
            }
            Err(ProjectError::Load(error)) => return Err(error.into()),
        };

        match self.output {
            OutputFormat::Json => Self::output_json(&course)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&course),
            OutputFormat::Table => Self::output_table(&course),
        }

        Ok(())
    }

    fn output_json(course: &ValidCourse) -> anyhow::Result<()> {
        use serde_json::json;

        let units: Vec<_> = course
            .units()
            .iter()
            .map(|unit| {
                json!({
                    "name": unit.name(),
                    "tag": unit.tag(),
                    "topics": unit.topics().len(),
                })
            })
            .collect();

        let output = json!({
            "name": course.name(),
            "description": course.description(),
            "units": units,
            "lessons": course.sequence().len(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(course: &ValidCourse) {
        println!("units={}", course.units().len());
        println!("lessons={}", course.sequence().len());
    }

    fn output_table(course: &ValidCourse) {
        println!("{}", paint(course.name(), Tone::Good));
        println!("{}", paint(course.description(), Tone::Muted));
        println!();

        let width = course
            .units()
            .iter()
            .map(|unit| unit.name().chars().count())
            .max()
            .unwrap_or(0);

        for (index, unit) in course.units().iter().enumerate() {
            println!(
                "{:>3}. {:<width$}  {} topics",
                index + 1,
                unit.name(),
                unit.topics().len()
            );
        }

        println!(
            "\n{} units, {} lessons",
            course.units().len(),
            course.sequence().len()
        );
    }
}
