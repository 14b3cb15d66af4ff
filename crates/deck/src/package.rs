//! Raw OPC container I/O: the zip archive without document semantics.

use std::io::{Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::DeckError;

/// Reads every file entry in archive order. Directory entries are skipped;
/// Office packages do not rely on them.
pub(crate) fn read_parts<R: Read + Seek>(reader: R) -> Result<Vec<(String, Vec<u8>)>, DeckError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut parts = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        parts.push((entry.name().to_string(), data));
    }
    Ok(parts)
}

/// Streams parts into a new archive, preserving the order they are given in.
pub(crate) struct PartWriter<W: Write + Seek> {
    inner: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> PartWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            inner: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    pub(crate) fn write_part(&mut self, name: &str, data: &[u8]) -> Result<(), DeckError> {
        self.inner.start_file(name, self.options)?;
        self.inner.write_all(data)?;
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<W, DeckError> {
        Ok(self.inner.finish()?)
    }
}
