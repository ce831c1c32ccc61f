//! roamdoc - convert outline markup files to HTML, LaTeX or JSON

mod output;
mod pdf;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use roamdoc_config::{Config, OutputFormat};
use roamdoc_engine::io::{self, Composition};
use roamdoc_engine::render::{HtmlOptions, LatexOptions, to_html, to_json, to_latex};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => LevelFilter::Error,
            Level::Warn => LevelFilter::Warn,
            Level::Info => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
        }
    }
}

#[derive(Parser)]
#[command(name = "roamdoc")]
#[command(version, about = "Convert outline markup files to HTML, LaTeX or JSON", long_about = None)]
#[command(after_help = "EXAMPLES:
    roamdoc notes.org -o notes.html          Convert one file
    roamdoc notes/ -t latex -o notes.tex     Convert every .org file in a directory
    roamdoc files.txt -t json                Convert the files listed in files.txt
    roamdoc notes.org --wk-pdf -o notes.pdf  Convert to PDF with wkhtmltopdf")]
struct Cli {
    /// Input .org file, directory of .org files, or file list
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output document type: html, json or latex
    #[arg(short = 't', long = "doc-type", value_name = "TYPE")]
    doc_type: Option<OutputFormat>,

    /// Embed the JSON tree in the HTML head
    #[arg(short = 'j', long)]
    include_json: bool,

    /// Log level
    #[arg(short = 'l', long = "logging", value_enum)]
    logging: Option<Level>,

    /// Allow overwriting an existing output file
    #[arg(long)]
    overwrite: bool,

    /// Convert the HTML output to PDF with wkhtmltopdf
    #[arg(long = "wk-pdf", requires = "output", conflicts_with = "doc_type")]
    wk_pdf: bool,

    /// Config file (default: ~/.config/roamdoc/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    Ok(loaded.unwrap_or_default())
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = cli
        .logging
        .map(LevelFilter::from)
        .or_else(|| {
            config
                .logging
                .level
                .as_deref()
                .and_then(|l| l.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Warn);
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn parse_input(input: &Path) -> Result<Composition> {
    let composition = if input.is_dir() {
        io::parse_directory(input)
    } else if input.extension().is_some_and(|e| e == "org") {
        io::parse_file(input)
    } else {
        io::parse_file_list(input)
    };
    composition.with_context(|| format!("failed to parse {}", input.display()))
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(cli, &config);

    if let Some(path) = &cli.output {
        output::check_output(path, cli.overwrite)?;
    }

    let composition = parse_input(&cli.input)?;
    let count = composition.diagnostics().count();
    if count > 0 {
        log::info!("{count} diagnostics while parsing {}", cli.input.display());
    }

    let format = if cli.wk_pdf {
        OutputFormat::Html
    } else {
        cli.doc_type.unwrap_or(config.render.format)
    };
    log::debug!("rendering {format}");
    let root = &composition.root;
    let text = match format {
        OutputFormat::Html => {
            let defaults = HtmlOptions::default();
            let options = HtmlOptions {
                stylesheet: config.render.stylesheet.clone().or(defaults.stylesheet),
                include_json: cli.include_json || config.render.include_json,
                ..defaults
            };
            to_html(root, &options)?
        }
        OutputFormat::Json => to_json(root)?,
        OutputFormat::Latex => to_latex(
            root,
            &LatexOptions {
                title: config.render.title.clone(),
            },
        )?,
    };

    if cli.wk_pdf {
        let Some(path) = cli.output.as_deref() else {
            bail!("--wk-pdf needs an output file");
        };
        return pdf::html_to_pdf(pdf::CONVERTER, &text, path);
    }
    output::write_output(cli.output.as_deref(), &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(&["roamdoc", "in.org"], None)]
    #[case(&["roamdoc", "in.org", "-t", "latex"], Some("Latex"))]
    #[case(&["roamdoc", "in.org", "--doc-type", "json"], Some("Json"))]
    #[case(&["roamdoc", "in.org", "-t", "TeX"], Some("Latex"))]
    fn doc_type_flag(#[case] args: &[&str], #[case] expected: Option<&str>) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.doc_type.map(|d| format!("{d:?}")).as_deref(), expected);
    }

    #[test]
    fn warning_is_accepted_for_warn() {
        let cli = Cli::try_parse_from(["roamdoc", "x.org", "-l", "warning"]).unwrap();
        assert!(matches!(cli.logging, Some(Level::Warn)));
    }

    #[test]
    fn unknown_doc_type_is_rejected() {
        assert!(Cli::try_parse_from(["roamdoc", "x.org", "-t", "pdf"]).is_err());
    }

    #[test]
    fn wk_pdf_needs_output() {
        assert!(Cli::try_parse_from(["roamdoc", "x.org", "--wk-pdf"]).is_err());

        let cli = Cli::try_parse_from(["roamdoc", "x.org", "--wk-pdf", "-o", "x.pdf"]).unwrap();
        assert!(cli.wk_pdf);
        assert_eq!(cli.output.as_deref(), Some(Path::new("x.pdf")));
    }

    #[test]
    fn wk_pdf_rejects_other_doc_types() {
        let args = ["roamdoc", "x.org", "--wk-pdf", "-o", "x.pdf", "-t", "latex"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn input_kind_picks_parser() {
        // Given a directory with one file and a list naming it
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.org");
        std::fs::write(&file, "* A\ntext\n").unwrap();
        let list = dir.path().join("files.txt");
        std::fs::write(&list, "a.org\n").unwrap();

        // Then all three inputs yield one branch
        for input in [dir.path(), file.as_path(), list.as_path()] {
            let comp = parse_input(input).unwrap();
            assert_eq!(comp.branches.len(), 1);
        }
    }

    #[test]
    fn missing_input_fails_with_context() {
        let err = parse_input(Path::new("/no/such/file.org")).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn explicit_missing_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
