use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use ua_gec_config::Config;
use ua_gec_engine::{AnnotatedText, Annotation, io};

mod report;

use report::{ErrorTally, validate};

#[derive(Parser)]
#[command(name = "ua-gec")]
#[command(about = "Inspect and validate UA-GEC annotated documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Corpus directory (defaults to `corpus_path` from the config file)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print one document
    Show {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = View::Annotated)]
        view: View,

        /// Suggestion level used by the corrected view
        #[arg(long, default_value_t = 0)]
        level: usize,

        /// Leave metadata out of the annotated view
        #[arg(long)]
        no_meta: bool,
    },
    /// Print the annotations of a document as TOML
    Annotations { file: PathBuf },
    /// Count annotations per error type over the corpus
    Errors,
    /// Check the corpus for consistency
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    Original,
    Corrected,
    Annotated,
}

#[derive(Serialize)]
struct AnnotationList<'a> {
    annotations: &'a [Annotation],
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Show {
            file,
            view,
            level,
            no_meta,
        } => {
            let text = read_document(&file)?;
            println!("{}", render(&text, view, level, !no_meta));
        }
        Command::Annotations { file } => {
            let text = read_document(&file)?;
            print!("{}", annotations_toml(&text)?);
        }
        Command::Errors => {
            let corpus = resolve_corpus(cli.corpus)?;
            let documents = io::load_documents(&corpus)?;
            println!("{}", ErrorTally::from_documents(&documents));
        }
        Command::Validate => {
            let corpus = resolve_corpus(cli.corpus)?;
            let documents = io::load_documents(&corpus)?;
            log::info!("Validating {} documents", documents.len());

            let issues = validate(&documents);
            for issue in &issues {
                println!("{issue}");
            }
            if !issues.is_empty() {
                eprintln!("{} issues found", issues.len());
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn read_document(file: &Path) -> Result<AnnotatedText> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    AnnotatedText::from_bytes(&bytes).with_context(|| format!("Failed to parse {}", file.display()))
}

fn render(text: &AnnotatedText, view: View, level: usize, with_meta: bool) -> String {
    match view {
        View::Original => text.original_text(),
        View::Corrected => text.corrected_text(level),
        View::Annotated => text.annotated_text(with_meta),
    }
}

fn annotations_toml(text: &AnnotatedText) -> Result<String> {
    let list = AnnotationList {
        annotations: text.annotations(),
    };
    Ok(toml::to_string_pretty(&list)?)
}

/// Corpus directory from `--corpus`, falling back to the config file.
fn resolve_corpus(arg: Option<PathBuf>) -> Result<PathBuf> {
    let config_path = Config::config_path();
    let (corpus, from_config) = match arg {
        Some(path) => (path, false),
        None => match Config::load()? {
            Some(config) => (config.corpus_path, true),
            None => bail!(
                "No corpus directory given and no config file found. \
                 Pass --corpus <DIR> or create {}",
                config_path.display()
            ),
        },
    };

    if let Err(e) = io::validate_corpus_dir(&corpus) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        bail!("Corpus path '{}'{source} is invalid: {e}", corpus.display());
    }

    log::info!("Using corpus at {}", corpus.display());
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_parses_show_options() {
        let cli = Cli::parse_from([
            "ua-gec", "show", "0001.a1.ann", "--view", "corrected", "--level", "1",
        ]);
        match cli.command {
            Command::Show {
                file,
                view,
                level,
                no_meta,
            } => {
                assert_eq!(file, PathBuf::from("0001.a1.ann"));
                assert_eq!(view, View::Corrected);
                assert_eq!(level, 1);
                assert!(!no_meta);
            }
            _ => panic!("expected show"),
        }
        assert!(cli.corpus.is_none());
    }

    #[test]
    fn cli_accepts_global_corpus() {
        let cli = Cli::parse_from(["ua-gec", "errors", "--corpus", "/data/corpus"]);
        assert_eq!(cli.corpus, Some(PathBuf::from("/data/corpus")));
        assert!(matches!(cli.command, Command::Errors));
    }

    #[test]
    fn render_views() {
        let text = AnnotatedText::new("{helo=>Hello|Hi:::error_type=Spelling} world");
        assert_eq!(render(&text, View::Original, 0, true), "helo world");
        assert_eq!(render(&text, View::Corrected, 1, true), "Hi world");
        assert_eq!(
            render(&text, View::Annotated, 0, false),
            "{helo=>Hello|Hi} world"
        );
    }

    #[test]
    fn annotations_as_toml() {
        let text = AnnotatedText::new("I {likes=>like:::error_type=Grammar} turtles");
        let rendered = annotations_toml(&text).unwrap();

        assert!(rendered.contains("[[annotations]]"));
        assert!(rendered.contains("source_text = \"likes\""));
        assert!(rendered.contains("error_type = \"Grammar\""));

        let value: toml::Table = toml::from_str(&rendered).unwrap();
        let annotations = value["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0]["start"].as_integer(), Some(2));
        assert_eq!(annotations[0]["end"].as_integer(), Some(7));
    }

    #[test]
    fn resolve_corpus_rejects_missing_dir() {
        let err = resolve_corpus(Some(PathBuf::from("/no/such/corpus"))).unwrap_err();
        assert!(err.to_string().contains("/no/such/corpus"));
    }
}
