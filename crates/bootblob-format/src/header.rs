//! Content-list header sector
//!
//! The header occupies sector 0 and holds one 16-byte record per component,
//! in image order. Unused space is zero.
//!
//! Record layout (little-endian):
//! ```text
//! offset 0x00: u32 image_len     (padded payload size in bytes)
//! offset 0x04: u32 lba_pos       (first payload sector)
//! offset 0x08: u32 dest_addr     (load address)
//! offset 0x0C: u32 encoded_type  (type, or 8 + slot for archives)
//! ```

use crate::component::{ComponentType, PlacedComponent};
use crate::error::{BlobError, Result};
use crate::layout::{Layout, MAX_COMPONENTS, RECORD_SIZE, SECTOR_SIZE};
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

/// One component entry of the header sector
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct HeaderRecord {
    /// Padded payload size in bytes
    pub image_len: u32,
    /// First payload sector
    pub lba_pos: u32,
    /// Load address
    pub dest_addr: u32,
    /// Wire form of the component type
    pub encoded_type: u32,
}

impl HeaderRecord {
    /// Build the record for a placed component
    pub fn from_component(component: &PlacedComponent) -> Self {
        Self {
            image_len: component.image_len,
            lba_pos: component.lba_pos,
            dest_addr: component.descriptor.dest_addr,
            encoded_type: component.encoded_type,
        }
    }

    /// Decode the type field
    pub fn component_type(&self) -> Result<ComponentType> {
        ComponentType::from_wire(self.encoded_type)
    }

    /// Sectors covered by the payload
    pub fn lba_len(&self) -> u32 {
        self.image_len / SECTOR_SIZE as u32
    }

    /// A slot with `lba_pos` 0 marks the end of the record list; sector 0
    /// is the header, so no payload starts there
    fn is_unused(&self) -> bool {
        self.lba_pos == 0
    }
}

/// Decoded or to-be-encoded header sector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobHeader {
    /// Records in image order
    pub records: Vec<HeaderRecord>,
}

impl BlobHeader {
    /// Collect the records for a finished layout
    pub fn from_layout(layout: &Layout) -> Result<Self> {
        if layout.len() > MAX_COMPONENTS {
            return Err(BlobError::HeaderOverflow {
                count: layout.len(),
                max: MAX_COMPONENTS,
            });
        }
        Ok(Self {
            records: layout
                .components()
                .iter()
                .map(HeaderRecord::from_component)
                .collect(),
        })
    }

    /// Serialize to a zero-filled 512-byte sector
    pub fn to_sector(&self) -> Result<[u8; SECTOR_SIZE]> {
        if self.records.len() > MAX_COMPONENTS {
            return Err(BlobError::HeaderOverflow {
                count: self.records.len(),
                max: MAX_COMPONENTS,
            });
        }

        let mut sector = [0u8; SECTOR_SIZE];
        let mut cursor = Cursor::new(&mut sector[..]);
        for record in &self.records {
            record.write(&mut cursor)?;
        }
        Ok(sector)
    }

    /// Parse the header from the start of an image
    ///
    /// Records are read until the first unused slot or the end of the sector.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SECTOR_SIZE {
            return Err(BlobError::TruncatedHeader {
                expected: SECTOR_SIZE,
                actual: data.len(),
            });
        }

        let mut cursor = Cursor::new(&data[..SECTOR_SIZE]);
        let mut records = Vec::new();
        for _ in 0..MAX_COMPONENTS {
            let record = HeaderRecord::read(&mut cursor)?;
            if record.is_unused() {
                break;
            }
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Sector just past the last payload the header describes
    pub fn end_lba(&self) -> u32 {
        self.records
            .iter()
            .map(|r| r.lba_pos.saturating_add(r.lba_len()))
            .max()
            .unwrap_or(1)
    }

    /// Image size implied by the records
    pub fn image_size(&self) -> u64 {
        u64::from(self.end_lba()) * SECTOR_SIZE as u64
    }
}

/// Encode the header sector for `layout`
pub fn encode(layout: &Layout) -> Result<[u8; SECTOR_SIZE]> {
    BlobHeader::from_layout(layout)?.to_sector()
}

const _: () = assert!(RECORD_SIZE * MAX_COMPONENTS == SECTOR_SIZE);
