use std::path::{Path, PathBuf};

mod sequence;
mod status;
mod terminal;
mod validate;

use clap::ArgAction;
use coursework::Project;
use sequence::Sequence;
use status::Status;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the course directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show a summary of the course (default)
    Status(Status),

    /// Write a default configuration file
    Init,

    /// Check one or more manifests for structural problems
    Validate(Validate),

    /// Print the ordered lesson sequence
    Sequence(Sequence),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init => Init::run(&root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Sequence(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        let config_path = Project::config_path(root);
        if config_path.exists() {
            anyhow::bail!(
                "Course already initialized (found existing {})",
                config_path.display()
            );
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", parent.display()))?;
        }

        let config = coursework::Config::default();
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized course configuration in {}", root.display());
        println!("  Created: .course/config.toml");
        println!();
        println!("Next steps:");
        println!(
            "  Write your manifest to {}",
            config.manifest().display()
        );
        println!("  course validate");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use coursework::Config;
    use tempfile::{tempdir, TempDir};

    use super::*;

    const COURSE: &str = r#"
name = "Rust"
description = "Learn Rust"

[[units]]
name = "Introduction"
topics = ["topics/first-project/topic.toml", "topics/basic-syntax/topic.toml"]

[[units]]
name = "Ownership"
topics = ["topics/move-semantics/topic.toml"]
"#;

    fn course_dir() -> TempDir {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("course.toml"), COURSE).unwrap();
        for slug in ["first-project", "basic-syntax", "move-semantics"] {
            let dir = tmp.path().join("topics").join(slug);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("topic.toml"), "").unwrap();
        }
        tmp
    }

    #[test]
    fn init_writes_default_config() {
        let tmp = tempdir().unwrap();

        Init::run(tmp.path()).expect("init should succeed");

        let config = Config::load(&Project::config_path(tmp.path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite_config() {
        let tmp = tempdir().unwrap();
        Init::run(tmp.path()).unwrap();

        let error = Init::run(tmp.path()).unwrap_err();
        assert!(error.to_string().contains("already initialized"));
    }

    #[test]
    fn status_run_succeeds_on_valid_course() {
        let tmp = course_dir();

        Status::default()
            .run(tmp.path().to_path_buf())
            .expect("status should succeed");
    }

    #[test]
    fn status_run_reports_missing_manifest() {
        let tmp = tempdir().unwrap();

        let error = Status::default()
            .run(tmp.path().to_path_buf())
            .unwrap_err();
        assert!(error.to_string().contains("manifest not found"));
    }

    #[test]
    fn sequence_run_lists_lessons() {
        let tmp = course_dir();

        for output in ["table", "json", "plain"] {
            Sequence::parse_from(["sequence", "--output", output])
                .run(tmp.path().to_path_buf())
                .expect("sequence should succeed");
        }
    }

    #[test]
    fn sequence_run_from_past_the_end_is_empty() {
        let tmp = course_dir();

        Sequence::parse_from(["sequence", "--from", "99"])
            .run(tmp.path().to_path_buf())
            .expect("resuming past the end should succeed");
    }

    #[test]
    fn missing_subcommand_defaults_to_status() {
        let tmp = course_dir();
        let root = tmp.path().to_str().unwrap();

        let cli = Cli::parse_from(["course", "--root", root]);
        assert!(cli.command.is_none());

        Command::Status(Status::default())
            .run(cli.root)
            .expect("status should succeed");
    }
}
