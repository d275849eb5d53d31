//! Archive member iteration
//!
//! Zip and tar walk their members in different ways: zip has a central
//! directory that can be indexed at random, tar is a forward-only stream of
//! headers. Both are exposed through [`MemberSource`], which hands out one
//! matching CSV member at a time.
//!
//! A yielded [`ArchiveMember`] borrows the source, so it has to be dropped
//! before the next call. For tar this is what keeps the entry stream valid.

use std::io::{Read, Seek};

use tracing::trace;
use zip::ZipArchive;

use super::error::IngestError;

/// Member names (case-insensitive) that are treated as CSV input
pub fn is_csv_member(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

/// One CSV member of an archive
pub struct ArchiveMember<'a> {
    pub name: String,
    pub content: Box<dyn Read + 'a>,
}

impl std::fmt::Debug for ArchiveMember<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveMember").field("name", &self.name).finish()
    }
}

/// Yields the CSV members of an archive in archive order
pub trait MemberSource {
    /// Next member whose name passes [`is_csv_member`]
    ///
    /// Returns `Ok(None)` once the archive is exhausted, and keeps returning
    /// it on later calls. Members that do not match are skipped without being
    /// opened.
    fn next_member(&mut self) -> Result<Option<ArchiveMember<'_>>, IngestError>;
}

/// Zip archive cursor over the central directory
pub struct ZipMembers<R: Read + Seek> {
    archive: ZipArchive<R>,
    cursor: usize,
}

impl<R: Read + Seek> ZipMembers<R> {
    /// Read the central directory; a malformed one fails here
    pub fn new(reader: R) -> Result<Self, IngestError> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }
}

impl<R: Read + Seek> MemberSource for ZipMembers<R> {
    fn next_member(&mut self) -> Result<Option<ArchiveMember<'_>>, IngestError> {
        while self.cursor < self.archive.len() {
            let index = self.cursor;
            self.cursor += 1;

            let name = match self.archive.name_for_index(index) {
                Some(name) if is_csv_member(name) => name.to_string(),
                Some(name) => {
                    trace!(member = %name, "Skipping non-CSV zip entry");
                    continue;
                },
                None => continue,
            };

            let file = self.archive.by_index(index)?;
            return Ok(Some(ArchiveMember {
                name,
                content: Box::new(file),
            }));
        }

        Ok(None)
    }
}

/// Tar archive cursor
///
/// Borrows the [`tar::Archive`] it walks. Once the entry stream ends the
/// `exhausted` flag short-circuits every later call.
pub struct TarMembers<'a, R: Read> {
    entries: tar::Entries<'a, R>,
    exhausted: bool,
}

impl<'a, R: Read> TarMembers<'a, R> {
    pub fn new(archive: &'a mut tar::Archive<R>) -> Result<Self, IngestError> {
        let entries = archive.entries().map_err(IngestError::Tar)?;
        Ok(Self {
            entries,
            exhausted: false,
        })
    }
}

impl<R: Read> MemberSource for TarMembers<'_, R> {
    fn next_member(&mut self) -> Result<Option<ArchiveMember<'_>>, IngestError> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            let entry = match self.entries.next() {
                Some(entry) => entry.map_err(IngestError::Tar)?,
                None => {
                    self.exhausted = true;
                    return Ok(None);
                },
            };

            let name = entry
                .path()
                .map_err(IngestError::Tar)?
                .to_string_lossy()
                .into_owned();

            if !is_csv_member(&name) {
                trace!(member = %name, "Skipping non-CSV tar entry");
                continue;
            }

            return Ok(Some(ArchiveMember {
                name,
                content: Box::new(entry),
            }));
        }
    }
}
