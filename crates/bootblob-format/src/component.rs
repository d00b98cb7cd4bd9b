//! Component descriptors and their type tags
//!
//! A component is one embedded file plus its placement metadata. The CLI layer
//! builds [`ComponentDescriptor`]s field by field; the layout planner turns
//! them into read-only [`PlacedComponent`]s.

use crate::error::{BlobError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Wire value of the first archive slot
pub const ARCHIVE_BASE: u32 = 8;

/// Highest archive slot whose wire value fits in a `u32`
pub const MAX_ARCHIVE_INDEX: u32 = u32::MAX - ARCHIVE_BASE;

/// Kind of payload a component carries
///
/// On the wire every kind is a single `u32`. Archives fold their slot number
/// into that value (`8 + index`), so a bootloader tells them apart by range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    /// No type given; never valid in a finished image
    #[default]
    None,
    /// Kernel image
    Kernel,
    /// Boot splash logo
    BootLogo,
    /// Raw binary loaded to its destination address
    BinLoad,
    /// Archive-indexed blob in the given slot
    Archive(u32),
}

impl ComponentType {
    /// Parse a CLI type token (`kernel`, `bootlogo`, `binload`, `arc`)
    ///
    /// `arc` yields slot 0; [`ComponentDescriptor::set_type_token`] fills in
    /// a slot given earlier.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "kernel" => Some(Self::Kernel),
            "bootlogo" => Some(Self::BootLogo),
            "binload" => Some(Self::BinLoad),
            "arc" => Some(Self::Archive(0)),
            _ => None,
        }
    }

    /// Encode to the 32-bit header type field
    ///
    /// `None` for an archive slot above [`MAX_ARCHIVE_INDEX`], whose value
    /// would overflow into the range of the other kinds.
    pub fn wire_value(self) -> Option<u32> {
        match self {
            Self::None => Some(0),
            Self::Kernel => Some(1),
            Self::BootLogo => Some(2),
            Self::BinLoad => Some(3),
            Self::Archive(index) => ARCHIVE_BASE.checked_add(index),
        }
    }

    /// Decode a header type field
    pub fn from_wire(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Kernel),
            2 => Ok(Self::BootLogo),
            3 => Ok(Self::BinLoad),
            v if v >= ARCHIVE_BASE => Ok(Self::Archive(v - ARCHIVE_BASE)),
            v => Err(BlobError::UnknownComponentType(v)),
        }
    }

    /// Short label used in layout tables
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Kernel => "kernel",
            Self::BootLogo => "logo",
            Self::BinLoad => "binload",
            Self::Archive(_) => "arc",
        }
    }

    /// Whether this type may appear in an image
    pub fn is_valid(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(index) => write!(f, "arc[{index}]"),
            other => f.write_str(other.label()),
        }
    }
}

/// One input file and the placement metadata supplied for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// File to embed
    pub source_path: PathBuf,
    /// Load address; opaque to this crate
    pub dest_addr: u32,
    /// Payload kind
    pub component_type: ComponentType,
    archive_index: u32,
}

impl ComponentDescriptor {
    /// Start an empty descriptor for `source_path`
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            dest_addr: 0,
            component_type: ComponentType::None,
            archive_index: 0,
        }
    }

    /// Set the destination load address
    #[must_use]
    pub fn with_dest_addr(mut self, dest_addr: u32) -> Self {
        self.dest_addr = dest_addr;
        self
    }

    /// Set the component type
    #[must_use]
    pub fn with_type(mut self, component_type: ComponentType) -> Self {
        self.set_type(component_type);
        self
    }

    /// Set the component type exactly as given
    pub fn set_type(&mut self, component_type: ComponentType) {
        if let ComponentType::Archive(index) = component_type {
            self.archive_index = index;
        }
        self.component_type = component_type;
    }

    /// Set the type from a CLI token
    ///
    /// `arc` picks up the slot from an earlier [`set_archive_index`] call.
    /// Returns `false` and leaves the type untouched for an unknown token.
    ///
    /// [`set_archive_index`]: Self::set_archive_index
    pub fn set_type_token(&mut self, token: &str) -> bool {
        match ComponentType::from_token(token) {
            Some(ComponentType::Archive(_)) => {
                self.component_type = ComponentType::Archive(self.archive_index);
                true
            }
            Some(component_type) => {
                self.component_type = component_type;
                true
            }
            None => false,
        }
    }

    /// Set the archive slot
    ///
    /// Only affects the encoded type once the component is an archive; the
    /// slot is remembered if the type arrives later.
    pub fn set_archive_index(&mut self, index: u32) {
        self.archive_index = index;
        if let ComponentType::Archive(_) = self.component_type {
            self.component_type = ComponentType::Archive(index);
        }
    }

    /// Archive slot recorded for this component
    pub fn archive_index(&self) -> u32 {
        self.archive_index
    }

    /// Source path as a `Path`
    pub fn path(&self) -> &Path {
        &self.source_path
    }
}

/// A component with its final position in the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedComponent {
    /// Descriptor as supplied
    pub descriptor: ComponentDescriptor,
    /// Size of the source file when planned
    pub raw_len: u64,
    /// Raw size rounded up to a 4096-byte multiple
    pub image_len: u32,
    /// First sector of the payload
    pub lba_pos: u32,
    /// Sectors occupied by the payload
    pub lba_len: u32,
    /// Header type field, checked when planned
    pub encoded_type: u32,
}

impl PlacedComponent {
    /// Sector just past this component
    pub fn end_lba(&self) -> u32 {
        self.lba_pos + self.lba_len
    }

    /// Byte offset of the payload within the image
    pub fn byte_offset(&self) -> u64 {
        u64::from(self.lba_pos) * crate::layout::SECTOR_SIZE as u64
    }
}
