//! pdfverify CLI - PDF layout verification tool

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfverify::{render, ErrorKind, JsonFormat, LoadedDocument, ThresholdInput, Verifier, VerifyEvent};

/// Exit status for invalid thresholds and other failures.
const EXIT_FAILURE: u8 = 1;

/// Exit status when the document cannot be opened or parsed.
const EXIT_LOAD: u8 = 2;

#[derive(Parser)]
#[command(name = "pdfverify")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Check PDF margins, indentation and image resolution", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    check: CheckArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Margins as top,bottom,left,right (points)
    #[arg(long, value_name = "T,B,L,R", default_value = "72,72,72,72")]
    margins: String,

    /// Minimum left indentation (points); extra comma-separated values are ignored
    #[arg(long, value_name = "N", default_value = "72")]
    indent: String,

    /// Required image resolution
    #[arg(long, value_name = "DPI", default_value = "300")]
    dpi: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Run log, one issue per line
    Text,
    /// Full report as JSON
    Json,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_check(&input, &cli.check)
            } else {
                println!(
                    "{}",
                    "Usage: pdfverify <FILE> --margins T,B,L,R --indent N --dpi DPI".yellow()
                );
                println!("       pdfverify --help for more information");
                Ok(())
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            match e.kind() {
                ErrorKind::Load => ExitCode::from(EXIT_LOAD),
                _ => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}

fn cmd_check(input: &Path, args: &CheckArgs) -> pdfverify::Result<()> {
    // Thresholds are validated before the file is touched
    let threshold_input = ThresholdInput::new(&args.margins, &args.indent, &args.dpi);
    let verifier = Verifier::from_input(&threshold_input)?;
    log::debug!("Thresholds: {:?}", verifier.thresholds());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading PDF...");
    let doc = match LoadedDocument::open(input) {
        Ok(doc) => doc,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let result = verifier.verify_document_with(&doc, |event| match event {
        VerifyEvent::LayoutStart { page_count } => {
            pb.set_message(format!("Checking margins and indentation ({} pages)...", page_count))
        }
        VerifyEvent::PageChecked { number, .. } => {
            pb.set_message(format!("Checked page {}", number))
        }
        VerifyEvent::ImagesStart { image_count } => {
            pb.set_message(format!("Checking figures ({} images)...", image_count))
        }
        VerifyEvent::ImageChecked { index, .. } => {
            pb.set_message(format!("Checked image {}", index))
        }
        VerifyEvent::Complete => pb.set_message("Done"),
    });
    pb.finish_and_clear();
    let report = result?;

    let output = match args.format {
        OutputFormat::Text => render::to_text(&report),
        OutputFormat::Json => {
            let format = if args.compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let mut json = render::to_json(&report, format)?;
            json.push('\n');
            json
        }
    };

    if let Some(path) = &args.output {
        fs::write(path, &output).map_err(|e| {
            pdfverify::Error::Render(format!("cannot write {}: {}", path.display(), e))
        })?;
        eprintln!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", output);
    }

    let summary = render::summary(&report);
    if report.is_clean() {
        eprintln!("{}", summary.green());
    } else {
        eprintln!("{}", summary.yellow());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfverify".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF layout verification tool");
    println!();
    println!("Checks: margins, indentation, image resolution");
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pdfverify", "doc.pdf"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("doc.pdf")));
        assert_eq!(cli.check.margins, "72,72,72,72");
        assert_eq!(cli.check.indent, "72");
        assert_eq!(cli.check.dpi, "300");
        assert!(cli.check.format == OutputFormat::Text);
    }

    #[test]
    fn test_bad_margins_fail_before_open() {
        let args = Cli::try_parse_from(["pdfverify", "missing.pdf", "--margins", "abc"])
            .unwrap()
            .check;
        let err = cmd_check(Path::new("/nonexistent/missing.pdf"), &args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let args = Cli::try_parse_from(["pdfverify", "missing.pdf"]).unwrap().check;
        let err = cmd_check(Path::new("/nonexistent/missing.pdf"), &args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    /// One blank Letter page.
    fn blank_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blank.pdf");
        let output = dir.path().join("report.txt");
        fs::write(&input, blank_pdf()).unwrap();

        let mut args = Cli::try_parse_from(["pdfverify", "blank.pdf"]).unwrap().check;
        args.output = Some(output.clone());
        cmd_check(&input, &args).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.ends_with("Verification complete.\n"));
    }

    #[test]
    fn test_unwritable_output_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blank.pdf");
        fs::write(&input, blank_pdf()).unwrap();

        let mut args = Cli::try_parse_from(["pdfverify", "blank.pdf", "--format", "json"])
            .unwrap()
            .check;
        args.output = Some(dir.path().join("missing").join("report.json"));
        let err = cmd_check(&input, &args).unwrap_err();
        assert!(matches!(err, pdfverify::Error::Render(_)));
    }

    #[test]
    fn test_version_subcommand() {
        let cli = Cli::try_parse_from(["pdfverify", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Version)));
    }
}
