// Thu Oct 15 2026 - Alex

use goblin::container::{Container, Ctx};
use goblin::elf::header::Header;
use goblin::elf::section_header::{section_header32, section_header64};
use goblin::elf::sym::{sym32, sym64};
use scroll::Endian;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class and data encoding of an ELF object, resolved once when the header is read.
/// Every later decode goes through [`ElfFormat::ctx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElfFormat {
    Elf32Le,
    Elf32Be,
    Elf64Le,
    Elf64Be,
}

impl ElfFormat {
    pub fn from_header(header: &Header) -> Result<Self, String> {
        let container = header
            .container()
            .map_err(|e| format!("unsupported ELF class: {}", e))?;
        let endian = header
            .endianness()
            .map_err(|e| format!("unsupported ELF data encoding: {}", e))?;

        Ok(match (container, endian) {
            (Container::Little, Endian::Little) => ElfFormat::Elf32Le,
            (Container::Little, Endian::Big) => ElfFormat::Elf32Be,
            (Container::Big, Endian::Little) => ElfFormat::Elf64Le,
            (Container::Big, Endian::Big) => ElfFormat::Elf64Be,
        })
    }

    pub fn is_64(self) -> bool {
        matches!(self, ElfFormat::Elf64Le | ElfFormat::Elf64Be)
    }

    pub fn is_little_endian(self) -> bool {
        matches!(self, ElfFormat::Elf32Le | ElfFormat::Elf64Le)
    }

    // goblin names the 32-bit container "Little" and the 64-bit one "Big"
    pub fn container(self) -> Container {
        if self.is_64() {
            Container::Big
        } else {
            Container::Little
        }
    }

    pub fn endian(self) -> Endian {
        if self.is_little_endian() {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    pub fn ctx(self) -> Ctx {
        Ctx::new(self.container(), self.endian())
    }

    pub fn symbol_size(self) -> usize {
        if self.is_64() {
            sym64::SIZEOF_SYM
        } else {
            sym32::SIZEOF_SYM
        }
    }

    pub fn section_header_size(self) -> usize {
        if self.is_64() {
            section_header64::SIZEOF_SHDR
        } else {
            section_header32::SIZEOF_SHDR
        }
    }
}

impl fmt::Display for ElfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElfFormat::Elf32Le => "ELF32 little-endian",
            ElfFormat::Elf32Be => "ELF32 big-endian",
            ElfFormat::Elf64Le => "ELF64 little-endian",
            ElfFormat::Elf64Be => "ELF64 big-endian",
        };
        write!(f, "{}", name)
    }
}
