use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use coursework::{
    load_all, Course, Diagnostic, Diagnostics, FsResolver, LoadError, Project, Validator,
};
use tracing::instrument;

use super::terminal::{paint, Tone};

#[derive(Debug, Parser)]
#[command(about = "Check course manifests for structural problems")]
pub struct Validate {
    /// Manifests to check (defaults to the manifest configured for the root)
    #[arg(value_name = "MANIFEST")]
    manifests: Vec<PathBuf>,

    /// Skip checking that topic files exist
    #[arg(long)]
    no_resolve: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

/// The outcome of checking a single manifest.
#[derive(Debug)]
enum Report {
    Valid { lessons: usize },
    Invalid(Diagnostics),
    Failed(LoadError),
}

impl Report {
    const fn has_issues(&self) -> bool {
        !matches!(self, Self::Valid { .. })
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::open(root);
        let resolve = project.config().resolve_topics && !self.no_resolve;

        let manifests = if self.manifests.is_empty() {
            vec![project.manifest_path()]
        } else {
            self.manifests.clone()
        };

        let reports: Vec<(PathBuf, Report)> = load_all(&manifests)
            .into_iter()
            .zip(manifests)
            .map(|(result, path)| {
                let resolver = resolve.then(|| resolver_for(&project, &path));
                let report = check(result, Validator::with_optional_resolver(resolver));
                (path, report)
            })
            .collect();

        match self.output {
            OutputFormat::Table => self.output_table(&reports),
            OutputFormat::Json => Self::output_json(&reports)?,
            OutputFormat::Summary => Self::output_summary(&reports),
        }

        if reports.iter().any(|(_, report)| report.has_issues()) {
            process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, reports: &[(PathBuf, Report)]) {
        for (path, report) in reports {
            match report {
                Report::Valid { lessons } => {
                    if !self.quiet {
                        println!(
                            "{}",
                            paint(
                                &format!("✓ {}: valid, {lessons} lessons", path.display()),
                                Tone::Good
                            )
                        );
                    }
                }
                Report::Invalid(diagnostics) => {
                    println!(
                        "{}",
                        paint(
                            &format!("✗ {}: {} problems", path.display(), diagnostics.len()),
                            Tone::Problem
                        )
                    );
                    print_diagnostics(diagnostics);
                }
                Report::Failed(error) => {
                    eprintln!("{}", paint(&format!("✗ {error}"), Tone::Broken));
                }
            }
        }

        if !self.quiet {
            let total: usize = reports.iter().map(|(_, report)| issue_count(report)).sum();
            if total == 0 {
                println!("\n{}", paint("All manifests are valid (0 issues)", Tone::Good));
            } else {
                println!(
                    "\n{}",
                    paint(&format!("Summary: {total} issues found"), Tone::Problem)
                );
            }
        }
    }

    fn output_json(reports: &[(PathBuf, Report)]) -> anyhow::Result<()> {
        use serde_json::json;

        let manifests: Vec<_> = reports
            .iter()
            .map(|(path, report)| match report {
                Report::Valid { lessons } => json!({
                    "manifest": path,
                    "status": "valid",
                    "lessons": lessons,
                }),
                Report::Invalid(diagnostics) => json!({
                    "manifest": path,
                    "status": "invalid",
                    "diagnostics": diagnostics,
                }),
                Report::Failed(error) => json!({
                    "manifest": path,
                    "status": "error",
                    "error": error.to_string(),
                }),
            })
            .collect();

        let total: usize = reports.iter().map(|(_, report)| issue_count(report)).sum();
        let output = json!({
            "status": if total == 0 { "healthy" } else { "issues_found" },
            "manifests": manifests,
            "summary": {
                "total_issues": total,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(reports: &[(PathBuf, Report)]) {
        let total: usize = reports.iter().map(|(_, report)| issue_count(report)).sum();
        println!("issues={total}");
    }
}

/// The configured topics root applies to the configured manifest, however it
/// is named on the command line. Other manifests resolve topics next to
/// themselves.
fn resolver_for(project: &Project, manifest: &Path) -> FsResolver {
    if same_file(manifest, &project.manifest_path()) {
        FsResolver::new(project.topics_root())
    } else {
        FsResolver::for_manifest(manifest)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn check<R>(result: Result<Course, LoadError>, validator: Validator<R>) -> Report
where
    R: coursework::TopicResolver,
{
    match result {
        Err(error) => Report::Failed(error),
        Ok(course) => match validator.validate(course) {
            Ok(course) => Report::Valid {
                lessons: course.sequence().len(),
            },
            Err(diagnostics) => Report::Invalid(diagnostics),
        },
    }
}

fn issue_count(report: &Report) -> usize {
    match report {
        Report::Valid { .. } => 0,
        Report::Invalid(diagnostics) => diagnostics.len(),
        Report::Failed(_) => 1,
    }
}

/// Prints one line per diagnostic, in report order.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        let kind = diagnostic.kind();
        println!(
            "  {}. [{}] {}",
            i + 1,
            paint(&kind.to_string(), kind),
            describe(diagnostic)
        );
    }
}

fn describe(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::EmptyUnits => "the course declares no units".to_string(),
        Diagnostic::EmptyTopics { unit, name } => {
            format!("unit {} '{name}' declares no topics", unit + 1)
        }
        Diagnostic::DuplicateUnitName { unit, first, name } => format!(
            "unit {} is named '{name}', like unit {}",
            unit + 1,
            first + 1
        ),
        Diagnostic::MalformedPath { unit, topic, path } => format!(
            "unit {}, topic {}: '{path}' should look like 'topics/<slug>/topic.toml'",
            unit + 1,
            topic + 1
        ),
        Diagnostic::UnresolvedTopic {
            unit,
            topic,
            path,
            reason,
        } => format!(
            "unit {}, topic {}: '{path}' {}",
            unit + 1,
            topic + 1,
            paint(reason, Tone::Muted)
        ),
    }
}

#[cfg(test)]
mod tests {
    use coursework::{parse, Config};
    use tempfile::tempdir;

    use super::*;

    const COURSE: &str = r#"
name = "Rust"
description = "Learn Rust"

[[units]]
name = "Introduction"
topics = ["topics/first-project/topic.toml", "topics/basic-syntax/topic.toml"]
"#;

    #[test]
    fn check_counts_lessons_of_a_valid_course() {
        let report = check(Ok(parse(COURSE).unwrap()), Validator::new());

        assert!(matches!(report, Report::Valid { lessons: 2 }));
        assert!(!report.has_issues());
        assert_eq!(issue_count(&report), 0);
    }

    #[test]
    fn check_counts_every_diagnostic() {
        let manifest = format!("{COURSE}\n[[units]]\nname = \"Introduction\"\ntopics = []\n");

        let report = check(Ok(parse(&manifest).unwrap()), Validator::new());

        let Report::Invalid(diagnostics) = &report else {
            panic!("expected an invalid report, got {report:?}");
        };
        assert_eq!(diagnostics.len(), 2);
        assert!(report.has_issues());
        assert_eq!(issue_count(&report), 2);
    }

    #[test]
    fn load_failure_counts_as_one_issue() {
        let report = check(
            Err(LoadError::NotFound(PathBuf::from("course.toml"))),
            Validator::new(),
        );

        assert!(matches!(report, Report::Failed(_)));
        assert_eq!(issue_count(&report), 1);
    }

    #[test]
    fn configured_topics_root_applies_to_the_configured_manifest_under_any_name() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("course.toml"), COURSE).unwrap();
        for slug in ["first-project", "basic-syntax"] {
            let dir = root.join("content").join("topics").join(slug);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("topic.toml"), "").unwrap();
        }

        let mut config = Config::default();
        config.set_topics_root(Some(PathBuf::from("content")));
        let project = Project::with_config(root.clone(), config);

        // Same file as the configured manifest, spelled differently.
        let spelled = root.join("content").join("..").join("course.toml");
        assert_ne!(spelled, project.manifest_path());

        let resolver = resolver_for(&project, &spelled);
        assert_eq!(resolver.root(), root.join("content"));

        let report = check(
            Ok(parse(COURSE).unwrap()),
            Validator::with_resolver(resolver),
        );
        assert!(matches!(report, Report::Valid { lessons: 2 }));
    }

    #[test]
    fn other_manifests_resolve_next_to_themselves() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let other = root.join("drafts").join("course.toml");
        fs::create_dir_all(other.parent().unwrap()).unwrap();
        fs::write(root.join("course.toml"), COURSE).unwrap();
        fs::write(&other, COURSE).unwrap();

        let project = Project::open(root.clone());

        assert_eq!(resolver_for(&project, &other).root(), root.join("drafts"));
    }

    #[test]
    fn run_accepts_the_configured_manifest_by_path() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("course.toml"), COURSE).unwrap();
        fs::create_dir_all(root.join(".course")).unwrap();
        fs::write(
            Project::config_path(&root),
            "_version = \"1\"\ntopics_root = \"content\"\n",
        )
        .unwrap();
        for slug in ["first-project", "basic-syntax"] {
            let dir = root.join("content").join("topics").join(slug);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("topic.toml"), "").unwrap();
        }

        let manifest = root.join(".course").join("..").join("course.toml");
        let validate = Validate::parse_from([
            PathBuf::from("validate"),
            manifest,
            PathBuf::from("--quiet"),
        ]);

        // Unresolved topics would exit the process with status 2.
        validate.run(root).expect("validate should succeed");
    }
}
