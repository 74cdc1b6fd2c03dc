use std::fmt;
use std::path::PathBuf;

use calstream_core::config::{OutputFormat, Settings};
use clap::{Parser, ValueEnum};

/// Stream iCalendar components from files or standard input.
#[derive(Debug, Parser)]
#[command(name = "calstream", version, about)]
pub struct Args {
    /// Calendar files to read, in order. `-` or no files reads stdin.
    pub files: Vec<PathBuf>,

    /// Output format; overrides `output.format`.
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Reject components nested deeper than this; overrides `parser.max_depth`.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Log filter, e.g. `debug` or `calstream_rfc=trace`; overrides `logging.level`.
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Outline,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Outline => Self::Outline,
        }
    }
}

/// Where calendar text is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Args {
    /// Applies command-line overrides on top of the loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(format) = self.format {
            settings.output.format = format.into();
        }
        if self.max_depth.is_some() {
            settings.parser.max_depth = self.max_depth;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }

    #[must_use]
    pub fn inputs(&self) -> Vec<Input> {
        if self.files.is_empty() {
            return vec![Input::Stdin];
        }
        self.files
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    Input::Stdin
                } else {
                    Input::File(path.clone())
                }
            })
            .collect()
    }
}
