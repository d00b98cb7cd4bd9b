//! Sector-packed firmware boot blobs
//!
#![allow(clippy::cast_possible_truncation)] // Sector arithmetic on u32 header fields
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A boot blob is a single flashable image assembled from separately built
//! firmware components (kernel, boot logo, raw loaders, archive slots). The
//! image starts with a one-sector content list that tells the bootloader where
//! each component lives and where to load it.
//!
//! # Image Format
//!
//! - Sector size: 512 bytes, LBA 0 is the header
//! - Header: one 16-byte little-endian record per component, at most 32
//! - Payloads: back to back from LBA 1 in registry order, each padded with
//!   zeros to a 4096-byte multiple
//!
//! # Pipeline
//!
//! [`ComponentRegistry`] → [`layout::plan`] → [`header::encode`] →
//! [`writer::BlobWriter`]. Planning finishes before any output is touched,
//! because the header embeds every component's final position.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bootblob_format::{ComponentRegistry, ComponentType, build_image};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ComponentRegistry::builder()
//!     .component("vmlinux.bin", 0x0010_0000, ComponentType::Kernel)
//!     .component("splash.bmp", 0x0080_0000, ComponentType::BootLogo)
//!     .build();
//!
//! let layout = build_image(registry, Path::new("out.bin"))?;
//! println!("{layout}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod component;
pub mod error;
pub mod header;
pub mod layout;
pub mod registry;
pub mod writer;

pub use component::{
    ARCHIVE_BASE, ComponentDescriptor, ComponentType, MAX_ARCHIVE_INDEX, PlacedComponent,
};
pub use error::{BlobError, Result};
pub use header::{BlobHeader, HeaderRecord};
pub use layout::{Layout, MAX_COMPONENTS, SECTOR_SIZE, plan, plan_with};
pub use registry::{ComponentRegistry, ComponentRegistryBuilder};
pub use writer::{BlobWriter, write_image, write_to};

use std::path::Path;

/// Plan `registry` and write the resulting image to `output`
///
/// The output file is only created once planning has succeeded.
pub fn build_image(registry: ComponentRegistry, output: &Path) -> Result<Layout> {
    let layout = plan(registry)?;
    write_image(output, &layout)?;
    Ok(layout)
}
