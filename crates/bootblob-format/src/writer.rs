//! Streaming blob output
//!
//! The writer emits the header sector, then every component's payload in
//! 512-byte sectors. Each component gets exactly `lba_len` sectors: file
//! content first, zeros after it up to the 4096-byte boundary.

use crate::component::PlacedComponent;
use crate::error::{BlobError, Result};
use crate::header;
use crate::layout::{Layout, SECTOR_SIZE};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Writes a planned layout to any byte sink
pub struct BlobWriter<W: Write> {
    sink: W,
    written: u64,
}

impl<W: Write> BlobWriter<W> {
    /// Wrap `sink`
    pub fn new(sink: W) -> Self {
        Self { sink, written: 0 }
    }

    /// Write header and payloads, returning the number of bytes written
    pub fn write_layout(&mut self, layout: &Layout) -> Result<u64> {
        let start = self.written;

        let sector = header::encode(layout)?;
        self.write_sector(&sector)?;

        for component in layout.components() {
            self.write_component(component)?;
        }

        let written = self.written - start;
        if written != layout.image_size() {
            return Err(BlobError::SizeMismatch {
                expected: layout.image_size(),
                actual: written,
            });
        }
        Ok(written)
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush the sink
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(|source| BlobError::Write { source })
    }

    /// Unwrap the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_component(&mut self, component: &PlacedComponent) -> Result<()> {
        let path = component.descriptor.path();
        let file = File::open(path).map_err(|source| BlobError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut source = SectorReader::new(file, path);

        let mut sector = [0u8; SECTOR_SIZE];
        for _ in 0..component.lba_len {
            source.next_sector(&mut sector);
            self.write_sector(&sector)?;
        }

        debug!(
            "wrote {} ({} of {} bytes are file data)",
            path.display(),
            source.consumed.min(u64::from(component.image_len)),
            component.image_len
        );
        Ok(())
    }

    fn write_sector(&mut self, sector: &[u8; SECTOR_SIZE]) -> Result<()> {
        self.sink
            .write_all(sector)
            .map_err(|source| BlobError::Write { source })?;
        self.written += SECTOR_SIZE as u64;
        Ok(())
    }
}

/// Sector-sized reads from a source that pads with zeros past EOF
struct SectorReader<'a, R> {
    inner: R,
    path: &'a Path,
    consumed: u64,
    exhausted: bool,
}

impl<'a, R: Read> SectorReader<'a, R> {
    fn new(inner: R, path: &'a Path) -> Self {
        Self {
            inner,
            path,
            consumed: 0,
            exhausted: false,
        }
    }

    /// Fill `sector` with the next 512 bytes, zero-filling whatever the
    /// source cannot supply. Read errors end the file instead of failing.
    fn next_sector(&mut self, sector: &mut [u8; SECTOR_SIZE]) {
        let mut filled = 0;
        while !self.exhausted && filled < SECTOR_SIZE {
            match self.inner.read(&mut sector[filled..]) {
                Ok(0) => self.exhausted = true,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(
                        "read error in {} after {} bytes, padding with zeros: {}",
                        self.path.display(),
                        self.consumed + filled as u64,
                        e
                    );
                    self.exhausted = true;
                }
            }
        }
        sector[filled..].fill(0);
        self.consumed += filled as u64;
    }
}

/// Create `path` and write the image for `layout` into it
pub fn write_image(path: &Path, layout: &Layout) -> Result<u64> {
    let file = File::create(path).map_err(|source| BlobError::OutputOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BlobWriter::new(BufWriter::new(file));
    let written = writer.write_layout(layout)?;
    writer.flush()?;

    info!("wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// Write the image for `layout` into an arbitrary sink
pub fn write_to<W: Write>(sink: W, layout: &Layout) -> Result<u64> {
    let mut writer = BlobWriter::new(sink);
    let written = writer.write_layout(layout)?;
    writer.flush()?;
    Ok(written)
}
