use std::path::PathBuf;

use clap::Parser;
use coursework::{Bookmark, Lesson, Project};
use tracing::instrument;

use super::terminal::{is_narrow, paint, Tone};

#[derive(Debug, Parser)]
#[command(about = "Print the course's lessons in order")]
pub struct Sequence {
    /// Resume from this zero-based lesson index
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    from: usize,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    /// One topic path per line
    Plain,
}

impl Sequence {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::open(root);
        let course = project.load_valid()?;
        let sequence = course.sequence();
        let lessons: Vec<Lesson<'_>> = sequence.resume(Bookmark::new(self.from)).collect();

        tracing::debug!(
            total = sequence.len(),
            from = self.from,
            shown = lessons.len(),
            "sequenced course"
        );

        match self.output {
            OutputFormat::Table => Self::output_table(&lessons),
            OutputFormat::Json => Self::output_json(&lessons)?,
            OutputFormat::Plain => {
                for lesson in &lessons {
                    println!("{}", lesson.topic);
                }
            }
        }

        Ok(())
    }

    fn output_table(lessons: &[Lesson<'_>]) {
        if lessons.is_empty() {
            println!("{}", paint("No lessons from this position.", Tone::Muted));
            return;
        }

        let narrow = is_narrow();
        let mut current_unit = None;

        for lesson in lessons {
            if narrow {
                println!("{:>4}  {}", lesson.index, lesson.topic);
                continue;
            }

            if current_unit != Some(lesson.unit_index) {
                current_unit = Some(lesson.unit_index);
                println!("{}", paint(lesson.unit.name(), Tone::Good));
            }
            println!(
                "{:>4}  {}",
                lesson.index,
                lesson.topic.slug().unwrap_or_else(|| lesson.topic.path())
            );
        }
    }

    fn output_json(lessons: &[Lesson<'_>]) -> anyhow::Result<()> {
        use serde_json::json;

        let output: Vec<_> = lessons
            .iter()
            .map(|lesson| {
                json!({
                    "index": lesson.index,
                    "unit": lesson.unit.name(),
                    "unit_index": lesson.unit_index,
                    "topic_index": lesson.topic_index,
                    "path": lesson.topic,
                    "next": lesson.next_bookmark(),
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
