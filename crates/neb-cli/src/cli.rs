use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "nebgen - Generates interpolated intermediate POSCAR images for a Nudged Elastic Band (NEB) calculation from the endpoint structures in the first and last numbered image directories.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Working directory containing the numbered image directories (00, 01, ...).
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    pub dir: PathBuf,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
