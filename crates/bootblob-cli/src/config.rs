//! Command-line configuration.
//!
//! Components are described by ordered, repeatable flags: `-f` starts a
//! component and the `-d`, `-t` and `-i` flags that follow it apply to that
//! component until the next `-f`. clap stores each flag's values separately,
//! so the original interleaving is rebuilt from the argument indices.
//!
//! # Example
//!
//! ```text
//! mkbootblob -f vmlinux.bin -d 00100000 -t kernel \
//!            -f splash.bmp -d 0x00800000 -t bootlogo \
//!            -f fonts.arc -t arc -i 2 -o flash.bin
//! ```

use crate::error::{CliError, Result};
use bootblob_format::ComponentRegistry;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::Level;

/// Output file used when neither `-o` nor the manifest names one.
pub const DEFAULT_OUTPUT: &str = "out.bin";

/// Arguments of the `mkbootblob` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mkbootblob",
    about = "Assemble a bootable firmware blob from separately built components",
    version
)]
pub struct Cli {
    /// Component file; starts a new component
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Destination load address of the current component (hex)
    #[arg(short = 'd', long = "dest", value_name = "HEX", value_parser = parse_hex_arg)]
    pub dests: Vec<u32>,

    /// Type of the current component: kernel, bootlogo, binload or arc
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Archive slot of the current component (hex)
    #[arg(short = 'i', long = "index", value_name = "HEX", value_parser = parse_hex_arg)]
    pub indices: Vec<u32>,

    /// Output image path [default: out.bin]
    #[arg(short, long, env = "MKBOOTBLOB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// JSON manifest listing components
    #[arg(short, long, env = "MKBOOTBLOB_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Plan and print the layout without writing an image
    #[arg(long)]
    pub dry_run: bool,

    /// Print the header of an existing image instead of building one;
    /// any manifest is ignored
    #[arg(long, value_name = "IMAGE", conflicts_with_all = ["files", "dry_run"])]
    pub inspect: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Verbosity of diagnostic output.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Per-component detail
    Debug,
    /// Plan and write summaries
    Info,
    /// Recoverable problems only
    Warn,
    /// Errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// One component flag in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `-f`: start a component
    File(PathBuf),
    /// `-d`: destination address
    Dest(u32),
    /// `-t`: type token
    Type(String),
    /// `-i`: archive slot
    Index(u32),
}

impl Directive {
    /// Apply this directive to `registry`.
    pub fn apply(self, registry: &mut ComponentRegistry) -> Result<()> {
        match self {
            Self::File(path) => registry.start_component(path),
            Self::Dest(addr) => registry.set_dest_addr(addr)?,
            Self::Type(token) => registry.set_type_token(&token)?,
            Self::Index(index) => registry.set_archive_index(index)?,
        }
        Ok(())
    }
}

/// Parsed arguments plus the component flags in their original order.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Parsed arguments
    pub cli: Cli,
    /// Component flags in command-line order
    pub directives: Vec<Directive>,
}

impl Invocation {
    /// Parse the process arguments, exiting with usage on error.
    #[must_use]
    pub fn from_args() -> Self {
        let matches = Cli::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Cli::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let cli = Cli::from_arg_matches(matches)?;
        Ok(Self {
            cli,
            directives: ordered_directives(matches),
        })
    }

    /// Feed the component flags into `registry`.
    pub fn apply_directives(&self, registry: &mut ComponentRegistry) -> Result<()> {
        for directive in self.directives.iter().cloned() {
            directive.apply(registry)?;
        }
        Ok(())
    }
}

fn ordered_directives(matches: &ArgMatches) -> Vec<Directive> {
    let mut ordered: Vec<(usize, Directive)> = Vec::new();

    collect::<PathBuf>(matches, "files", &mut ordered, Directive::File);
    collect::<u32>(matches, "dests", &mut ordered, Directive::Dest);
    collect::<String>(matches, "types", &mut ordered, Directive::Type);
    collect::<u32>(matches, "indices", &mut ordered, Directive::Index);

    ordered.sort_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, d)| d).collect()
}

fn collect<T>(
    matches: &ArgMatches,
    id: &str,
    out: &mut Vec<(usize, Directive)>,
    wrap: fn(T) -> Directive,
) where
    T: Clone + Send + Sync + 'static,
{
    if let (Some(indices), Some(values)) = (matches.indices_of(id), matches.get_many::<T>(id)) {
        out.extend(indices.zip(values.cloned().map(wrap)));
    }
}

/// Parse a hexadecimal `u32`, with or without a `0x` prefix.
pub fn parse_hex(value: &str) -> Result<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16).map_err(|_| CliError::InvalidHex {
        value: value.to_string(),
    })
}

fn parse_hex_arg(value: &str) -> std::result::Result<u32, String> {
    parse_hex(value).map_err(|e| e.to_string())
}
