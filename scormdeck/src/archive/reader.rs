//! Zip archive parsing and entry decompression.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use flate2::Crc;

use super::records::{ArchiveEntry, ArchiveError, CompressionMethod};

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_DIR_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Fixed size of the end-of-central-directory record.
const EOCD_SIZE: usize = 22;

/// Maximum trailing comment length, bounding the EOCD search window.
const MAX_COMMENT: usize = 65_535;

/// Flag bit 0: entry is encrypted.
const FLAG_ENCRYPTED: u16 = 1;

/// A parsed zip archive held in memory.
///
/// Parsing reads only the central directory; entry data is decompressed
/// on demand via [`decompress`](Self::decompress).
#[derive(Debug)]
pub struct ZipArchive {
    data: Vec<u8>,
    entries: Vec<ArchiveEntry>,
}

impl ZipArchive {
    /// Parse the central directory of `data`.
    pub fn parse(data: Vec<u8>) -> Result<Self, ArchiveError> {
        let eocd_offset = find_eocd(&data)?;
        let mut cursor = Cursor::new(&data[eocd_offset..]);
        cursor.read_u32::<LittleEndian>()?; // signature, already matched
        cursor.read_u16::<LittleEndian>()?; // disk number
        cursor.read_u16::<LittleEndian>()?; // central directory disk
        cursor.read_u16::<LittleEndian>()?; // entries on this disk
        let total_entries = cursor.read_u16::<LittleEndian>()?;
        cursor.read_u32::<LittleEndian>()?; // central directory size
        let cd_offset = cursor.read_u32::<LittleEndian>()? as u64;

        let mut cursor = Cursor::new(data.as_slice());
        cursor.set_position(cd_offset);
        let mut entries = Vec::with_capacity(total_entries as usize);
        for _ in 0..total_entries {
            entries.push(read_central_entry(&mut cursor, &data)?);
        }

        Ok(Self { data, entries })
    }

    /// All entries in central-directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of non-directory entries.
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir()).count()
    }

    /// Look up an entry by its exact (case-sensitive) archived name.
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Decompress one entry and verify its CRC-32.
    pub fn decompress(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, ArchiveError> {
        let data_start = self.entry_data_offset(entry)?;
        let data_end = data_start
            .checked_add(entry.compressed_size as usize)
            .filter(|end| *end <= self.data.len())
            .ok_or(ArchiveError::Truncated("entry data"))?;
        let raw = &self.data[data_start..data_end];

        let bytes = match entry.compression {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => {
                let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
                DeflateDecoder::new(raw).read_to_end(&mut out)?;
                out
            }
        };

        let mut crc = Crc::new();
        crc.update(&bytes);
        if crc.sum() != entry.crc32 {
            return Err(ArchiveError::ChecksumMismatch {
                name: entry.name.clone(),
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }
        Ok(bytes)
    }

    /// Resolve the start of an entry's data, past its local header.
    ///
    /// Local header name/extra lengths can differ from the central
    /// directory's, so they are read from the local header itself.
    fn entry_data_offset(&self, entry: &ArchiveEntry) -> Result<usize, ArchiveError> {
        let mut cursor = Cursor::new(self.data.as_slice());
        cursor.set_position(entry.local_header_offset);
        let signature = cursor.read_u32::<LittleEndian>()?;
        if signature != LOCAL_HEADER_SIGNATURE {
            return Err(ArchiveError::BadSignature {
                record: "local file header",
                offset: entry.local_header_offset,
            });
        }
        cursor.set_position(entry.local_header_offset + 26);
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;
        Ok((entry.local_header_offset + 30 + name_len + extra_len) as usize)
    }
}

/// Scan backwards for the end-of-central-directory signature.
fn find_eocd(data: &[u8]) -> Result<usize, ArchiveError> {
    if data.len() < EOCD_SIZE {
        return Err(ArchiveError::MissingEndOfDirectory);
    }
    let floor = data.len().saturating_sub(EOCD_SIZE + MAX_COMMENT);
    let mut offset = data.len() - EOCD_SIZE;
    loop {
        if u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) == EOCD_SIGNATURE
        {
            return Ok(offset);
        }
        if offset == floor {
            return Err(ArchiveError::MissingEndOfDirectory);
        }
        offset -= 1;
    }
}

fn read_central_entry(
    cursor: &mut Cursor<&[u8]>,
    data: &[u8],
) -> Result<ArchiveEntry, ArchiveError> {
    let offset = cursor.position();
    let signature = cursor.read_u32::<LittleEndian>()?;
    if signature != CENTRAL_DIR_SIGNATURE {
        return Err(ArchiveError::BadSignature {
            record: "central directory entry",
            offset,
        });
    }
    cursor.read_u16::<LittleEndian>()?; // version made by
    cursor.read_u16::<LittleEndian>()?; // version needed
    let flags = cursor.read_u16::<LittleEndian>()?;
    let method = cursor.read_u16::<LittleEndian>()?;
    cursor.read_u16::<LittleEndian>()?; // modification time
    cursor.read_u16::<LittleEndian>()?; // modification date
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()? as usize;
    let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
    let comment_len = cursor.read_u16::<LittleEndian>()? as usize;
    cursor.read_u16::<LittleEndian>()?; // disk number start
    cursor.read_u16::<LittleEndian>()?; // internal attributes
    cursor.read_u32::<LittleEndian>()?; // external attributes
    let local_header_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let name_start = cursor.position() as usize;
    let name_end = name_start
        .checked_add(name_len)
        .filter(|end| *end <= data.len())
        .ok_or(ArchiveError::Truncated("entry name"))?;
    let name = String::from_utf8_lossy(&data[name_start..name_end]).into_owned();
    cursor.set_position((name_end + extra_len + comment_len) as u64);

    if flags & FLAG_ENCRYPTED != 0 {
        return Err(ArchiveError::Encrypted(name));
    }
    let compression = CompressionMethod::from_wire(&name, method)?;

    Ok(ArchiveEntry {
        name,
        compression,
        compressed_size,
        uncompressed_size,
        crc32,
        local_header_offset,
    })
}
