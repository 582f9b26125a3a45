use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

/// Reformats a DOCX document into an approximation of APA style: 1-inch
/// margins, Times New Roman 12pt, double spacing, and a sorted, re-indented
/// references section.
#[derive(Parser)]
#[command(name = "apaforma", version, about)]
struct Cli {
    /// Input .docx file
    input: PathBuf,

    /// Output path (defaults to "<input stem>_apa.docx" next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("documento");
    input.with_file_name(format!("{stem}_apa.docx"))
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("█▓▒░"));
    bar
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));

    let bar = progress_bar(cli.quiet);
    bar.set_message("Aplicando formato APA");

    match apaforma::format_docx(&cli.input, &output, |percent| {
        bar.set_position(percent.round() as u64);
    }) {
        Ok(()) => {
            bar.set_position(100);
            bar.finish_and_clear();
            println!("Documento guardado en formato APA: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            bar.finish_and_clear();
            eprintln!("Hubo un error: {e}");
            ExitCode::FAILURE
        }
    }
}
