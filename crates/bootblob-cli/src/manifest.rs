//! JSON component manifests.
//!
//! A manifest is the file form of the command-line component flags, handy
//! when a firmware build always assembles the same set of parts:
//!
//! ```json
//! {
//!   "output": "flash.bin",
//!   "components": [
//!     { "file": "vmlinux.bin", "dest": "0x00100000", "type": "kernel" },
//!     { "file": "fonts.arc", "dest": 67108864, "type": "arc", "index": 2 }
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the manifest's directory.

use crate::config::parse_hex;
use crate::error::{CliError, Result};
use bootblob_format::ComponentRegistry;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Output image path
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Components in image order
    pub components: Vec<ManifestComponent>,
}

/// One component entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestComponent {
    /// Source file
    pub file: PathBuf,

    /// Destination load address
    #[serde(default)]
    pub dest: Option<Number>,

    /// Type token (kernel, bootlogo, binload, arc)
    #[serde(rename = "type", default)]
    pub component_type: Option<String>,

    /// Archive slot
    #[serde(default)]
    pub index: Option<Number>,
}

/// A 32-bit value written either as a JSON number or a hex string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Number {
    /// Plain JSON number
    Int(u32),
    /// Hex text, `0x` prefix optional
    Hex(String),
}

impl Number {
    /// Resolve to a `u32`.
    pub fn value(&self) -> Result<u32> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Hex(s) => parse_hex(s),
        }
    }
}

impl Manifest {
    /// Load a manifest from disk, resolving relative paths against its
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| CliError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CliError::ManifestParse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        manifest.rebase(base);
        Ok(manifest)
    }

    /// Parse a manifest from a JSON string without touching paths.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn rebase(&mut self, base: &Path) {
        if let Some(output) = &mut self.output
            && output.is_relative()
        {
            *output = base.join(&*output);
        }
        for component in &mut self.components {
            if component.file.is_relative() {
                component.file = base.join(&component.file);
            }
        }
    }

    /// Append the manifest's components to `registry`.
    pub fn apply(&self, registry: &mut ComponentRegistry) -> Result<()> {
        for component in &self.components {
            registry.start_component(&component.file);
            if let Some(dest) = &component.dest {
                registry.set_dest_addr(dest.value()?)?;
            }
            if let Some(index) = &component.index {
                registry.set_archive_index(index.value()?)?;
            }
            if let Some(token) = &component.component_type {
                registry.set_type_token(token)?;
            }
        }
        Ok(())
    }
}
