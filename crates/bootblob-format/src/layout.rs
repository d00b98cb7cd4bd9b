//! Sector layout planning
//!
//! Sector 0 holds the header. Components follow back to back in registry
//! order starting at sector 1, each padded to a 4096-byte multiple, so every
//! component covers a whole number of 8-sector blocks.
//!
//! ```text
//! LBA 0            LBA 1                     LBA 1 + n0
//! +--------+--------------------------+---------------------+---
//! | header | component 0 (n0 sectors) | component 1 ...     |
//! +--------+--------------------------+---------------------+---
//! ```

use crate::component::{ComponentDescriptor, MAX_ARCHIVE_INDEX, PlacedComponent};
use crate::error::{BlobError, Result};
use crate::registry::ComponentRegistry;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Size of one logical block
pub const SECTOR_SIZE: usize = 512;

/// Allocation unit for component payloads
pub const BLOCK_SIZE: u64 = 4096;

/// Sector holding the content-list header
pub const HEADER_LBA: u32 = 0;

/// Sector where the first payload starts
pub const FIRST_PAYLOAD_LBA: u32 = HEADER_LBA + 1;

/// Size of one header record
pub const RECORD_SIZE: usize = 16;

/// Header records that fit in one sector
pub const MAX_COMPONENTS: usize = SECTOR_SIZE / RECORD_SIZE;

/// Round `raw` up to the next multiple of [`BLOCK_SIZE`]
///
/// Returns `None` if the result does not fit in a `u64`.
pub fn padded_len(raw: u64) -> Option<u64> {
    raw.checked_add(BLOCK_SIZE - 1).map(|v| v & !(BLOCK_SIZE - 1))
}

/// Finalized placement of every component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    components: Vec<PlacedComponent>,
    end_lba: u32,
}

impl Layout {
    /// Placed components in image order
    pub fn components(&self) -> &[PlacedComponent] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false for a planned layout
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sector cursor after the last component
    pub fn end_lba(&self) -> u32 {
        self.end_lba
    }

    /// Total image size in bytes, header included
    pub fn image_size(&self) -> u64 {
        u64::from(self.end_lba) * SECTOR_SIZE as u64
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "destination |    size    |  lba-pos | lba-len |  type   | filename"
        )?;
        writeln!(f, "{}", "-".repeat(67))?;
        for c in &self.components {
            writeln!(
                f,
                " 0x{:08x} | {:>10} | {:>8} | {:>7} | {:^7} | {}",
                c.descriptor.dest_addr,
                c.image_len,
                c.lba_pos,
                c.lba_len,
                c.descriptor.component_type.label(),
                c.descriptor.source_path.display()
            )?;
        }
        Ok(())
    }
}

/// Plan a layout using on-disk file sizes
pub fn plan(registry: ComponentRegistry) -> Result<Layout> {
    plan_with(registry, |path| {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        Ok(meta.len())
    })
}

/// Plan a layout, asking `size_of` for each source file's length
///
/// Nothing is placed unless every component validates, so a failed plan
/// leaves no partial state behind.
pub fn plan_with<F>(registry: ComponentRegistry, mut size_of: F) -> Result<Layout>
where
    F: FnMut(&Path) -> std::io::Result<u64>,
{
    if registry.is_empty() {
        return Err(BlobError::EmptyInput);
    }
    if registry.len() > MAX_COMPONENTS {
        return Err(BlobError::HeaderOverflow {
            count: registry.len(),
            max: MAX_COMPONENTS,
        });
    }

    let mut cursor = FIRST_PAYLOAD_LBA;
    let mut components = Vec::with_capacity(registry.len());

    for descriptor in registry.into_inner() {
        let placed = place(descriptor, cursor, &mut size_of)?;
        cursor = placed
            .lba_pos
            .checked_add(placed.lba_len)
            .ok_or(BlobError::ImageTooLarge)?;
        debug!(
            "placed {} at lba {} ({} sectors)",
            placed.descriptor.source_path.display(),
            placed.lba_pos,
            placed.lba_len
        );
        components.push(placed);
    }

    let layout = Layout {
        components,
        end_lba: cursor,
    };
    info!(
        "planned {} components, {} sectors ({} bytes)",
        layout.len(),
        layout.end_lba(),
        layout.image_size()
    );
    Ok(layout)
}

fn place<F>(
    descriptor: ComponentDescriptor,
    lba_pos: u32,
    size_of: &mut F,
) -> Result<PlacedComponent>
where
    F: FnMut(&Path) -> std::io::Result<u64>,
{
    if !descriptor.component_type.is_valid() {
        return Err(BlobError::InvalidComponentType {
            path: descriptor.source_path,
        });
    }

    let Some(encoded_type) = descriptor.component_type.wire_value() else {
        return Err(BlobError::ArchiveIndexOutOfRange {
            index: descriptor.archive_index(),
            path: descriptor.source_path,
            max: MAX_ARCHIVE_INDEX,
        });
    };

    let raw_len = match size_of(descriptor.path()) {
        Ok(len) => len,
        Err(source) => {
            return Err(BlobError::SourceNotFound {
                path: descriptor.source_path,
                source,
            });
        }
    };

    let image_len = padded_len(raw_len)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or_else(|| BlobError::ComponentTooLarge {
            path: descriptor.source_path.clone(),
            size: raw_len,
        })?;

    Ok(PlacedComponent {
        descriptor,
        raw_len,
        image_len,
        lba_pos,
        lba_len: image_len / SECTOR_SIZE as u32,
        encoded_type,
    })
}
