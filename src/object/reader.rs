// Thu Oct 15 2026 - Alex

use crate::object::{ElfFormat, ParseError};
use goblin::elf::header::{Header, ELFMAG, SELFMAG, SIZEOF_IDENT};
use goblin::elf::section_header::{SectionHeader, SHN_XINDEX};
use goblin::elf::Elf;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Deref;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    #[default]
    Buffered,
    Mapped,
}

enum ObjectBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for ObjectBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ObjectBytes::Owned(data) => data,
            ObjectBytes::Mapped(map) => map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    pub name: String,
    pub kind: u32,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub entry_size: u64,
}

/// A parsed ELF object. Header and section index are fixed once `open` returns.
pub struct BinaryObject {
    path: PathBuf,
    bytes: ObjectBytes,
    header: Header,
    format: ElfFormat,
    sections: Vec<Section>,
}

impl BinaryObject {
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let unreadable = |source: io::Error| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        // checked before opening, a FIFO would block the open itself
        let metadata = fs::metadata(path).map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        if metadata.len() == 0 {
            return Err(ParseError::Malformed {
                path: path.to_path_buf(),
                reason: "empty file".to_string(),
            });
        }

        let mut file = File::open(path).map_err(unreadable)?;
        let bytes = match mode {
            ReadMode::Buffered => {
                let mut data = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or(0));
                file.read_to_end(&mut data).map_err(unreadable)?;
                ObjectBytes::Owned(data)
            }
            // SAFETY: the map is read-only and private to this handle; callers
            // accept that a file truncated underneath a live map is undefined.
            ReadMode::Mapped => ObjectBytes::Mapped(unsafe { Mmap::map(&file) }.map_err(unreadable)?),
        };

        Self::from_bytes(path.to_path_buf(), bytes)
    }

    /// Parses an in-memory image as if it had been read from `path`.
    pub fn parse(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, ParseError> {
        Self::from_bytes(path.into(), ObjectBytes::Owned(data))
    }

    fn from_bytes(path: PathBuf, bytes: ObjectBytes) -> Result<Self, ParseError> {
        let malformed = |reason: String| ParseError::Malformed {
            path: path.clone(),
            reason,
        };

        if bytes.len() < SIZEOF_IDENT {
            return Err(malformed(format!(
                "{} bytes is too small for an ELF identification",
                bytes.len()
            )));
        }
        if &bytes[..SELFMAG] != ELFMAG {
            return Err(malformed("bad ELF magic".to_string()));
        }

        let header = Elf::parse_header(&bytes).map_err(|e| malformed(e.to_string()))?;
        let format = ElfFormat::from_header(&header).map_err(&malformed)?;
        let sections = parse_sections(&bytes, &header, format).map_err(&malformed)?;

        log::trace!(
            "{}: {} with {} sections",
            path.display(),
            format,
            sections.len()
        );

        Ok(Self {
            path,
            bytes,
            header,
            format,
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn format(&self) -> ElfFormat {
        self.format
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_by_type(&self, kind: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Bytes of `section`, or `None` when its extent runs past the end of the file.
    pub fn section_data(&self, section: &Section) -> Option<&[u8]> {
        slice_at(&self.bytes, section.offset, section.size)
    }
}

impl std::fmt::Debug for BinaryObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryObject")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("size", &self.bytes.len())
            .field("sections", &self.sections.len())
            .finish()
    }
}

fn parse_sections(bytes: &[u8], header: &Header, format: ElfFormat) -> Result<Vec<Section>, String> {
    if header.e_shoff == 0 {
        return Ok(Vec::new());
    }

    let shoff = usize::try_from(header.e_shoff)
        .map_err(|_| format!("section table offset 0x{:x} out of range", header.e_shoff))?;
    if shoff
        .checked_add(format.section_header_size())
        .map_or(true, |end| end > bytes.len())
    {
        return Err(format!("section table offset 0x{:x} past end of file", shoff));
    }

    // a zero e_shnum makes goblin pick up the real count from section 0's sh_size
    let headers = SectionHeader::parse(bytes, shoff, header.e_shnum as usize, format.ctx())
        .map_err(|e| format!("section header table: {}", e))?;

    let shstrndx = if u32::from(header.e_shstrndx) == SHN_XINDEX {
        headers.first().map_or(0, |sh| sh.sh_link as usize)
    } else {
        header.e_shstrndx as usize
    };
    let names = if shstrndx == 0 {
        None
    } else {
        headers
            .get(shstrndx)
            .and_then(|sh| slice_at(bytes, sh.sh_offset, sh.sh_size))
    };

    Ok(headers
        .iter()
        .enumerate()
        .map(|(index, sh)| Section {
            index,
            name: names
                .and_then(|table| read_cstr(table, sh.sh_name))
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .unwrap_or_default(),
            kind: sh.sh_type,
            offset: sh.sh_offset,
            size: sh.sh_size,
            link: sh.sh_link,
            entry_size: sh.sh_entsize,
        })
        .collect())
}

pub(crate) fn slice_at(bytes: &[u8], offset: u64, size: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(size).ok()?)?;
    bytes.get(start..end)
}

/// NUL-terminated string at `offset` in `table`; `None` if out of range or unterminated.
pub(crate) fn read_cstr(table: &[u8], offset: usize) -> Option<&[u8]> {
    let rest = table.get(offset..)?;
    let len = rest.iter().position(|&b| b == 0)?;
    Some(&rest[..len])
}
