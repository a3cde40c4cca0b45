// Thu Oct 15 2026 - Alex

//! Synthesizes small ELF shared objects for tests. Only the pieces symbol
//! lookup reads are emitted: an ELF header, `.text`, `.dynstr`, `.dynsym`,
//! `.dynamic` and `.shstrtab`, followed by the section header table.

use crate::object::ElfFormat;
use goblin::elf::dynamic::{Dyn, DT_NULL};
use goblin::elf::header::{Header, EM_386, EM_X86_64};
use goblin::elf::section_header::{
    SectionHeader, SHF_ALLOC, SHF_EXECINSTR, SHT_DYNAMIC, SHT_DYNSYM, SHT_NULL, SHT_PROGBITS, SHT_STRTAB,
};
use goblin::elf::sym::{Sym, STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_NOTYPE, STT_OBJECT};
use goblin::error::Error;
use scroll::{Cwrite, Pwrite};
use std::io;
use std::path::Path;

const TEXT_SECTION: u16 = 1;

#[derive(Debug, Clone)]
pub struct TestSymbol {
    pub name: String,
    pub kind: u8,
    pub bind: u8,
    pub shndx: u16,
    pub value: u64,
    pub size: u64,
    pub name_offset: Option<u32>,
}

impl TestSymbol {
    /// A defined global function living in `.text`.
    pub fn function(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            kind: STT_FUNC,
            bind: STB_GLOBAL,
            shndx: TEXT_SECTION,
            value,
            size: 16,
            name_offset: None,
        }
    }

    /// An undefined reference, the way a caller of `name` records it.
    pub fn import(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: STT_FUNC,
            bind: STB_GLOBAL,
            shndx: 0,
            value: 0,
            size: 0,
            name_offset: None,
        }
    }

    pub fn object(name: &str, value: u64) -> Self {
        Self {
            kind: STT_OBJECT,
            ..Self::function(name, value)
        }
    }

    pub fn untyped(name: &str, value: u64) -> Self {
        Self {
            kind: STT_NOTYPE,
            ..Self::function(name, value)
        }
    }

    pub fn local(mut self) -> Self {
        self.bind = STB_LOCAL;
        self
    }

    pub fn weak(mut self) -> Self {
        self.bind = STB_WEAK;
        self
    }

    pub fn with_kind(mut self, kind: u8) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    /// Points `st_name` at an arbitrary string table offset instead of this symbol's name.
    pub fn with_name_offset(mut self, offset: u32) -> Self {
        self.name_offset = Some(offset);
        self
    }
}

struct SectionLayout {
    name: &'static str,
    kind: u32,
    flags: u32,
    data: Vec<u8>,
    link: u32,
    info: u32,
    entry_size: usize,
}

impl SectionLayout {
    fn new(name: &'static str, kind: u32, data: Vec<u8>) -> Self {
        Self {
            name,
            kind,
            flags: 0,
            data,
            link: 0,
            info: 0,
            entry_size: 0,
        }
    }
}

pub struct ElfBuilder {
    format: ElfFormat,
    symbols: Vec<TestSymbol>,
    dynamic: bool,
    dynsym: bool,
    section_table: bool,
}

impl ElfBuilder {
    pub fn new(format: ElfFormat) -> Self {
        Self {
            format,
            symbols: Vec::new(),
            dynamic: true,
            dynsym: true,
            section_table: true,
        }
    }

    pub fn shared_object() -> Self {
        Self::new(ElfFormat::Elf64Le)
    }

    pub fn symbol(mut self, symbol: TestSymbol) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn symbols<I: IntoIterator<Item = TestSymbol>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    pub fn without_dynamic(mut self) -> Self {
        self.dynamic = false;
        self
    }

    pub fn without_dynsym(mut self) -> Self {
        self.dynsym = false;
        self
    }

    pub fn without_section_table(mut self) -> Self {
        self.section_table = false;
        self
    }

    pub fn write_to<P: AsRef<Path>>(self, path: P) -> io::Result<()> {
        let data = self.build().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, data)
    }

    /// Lays out and encodes the object. Every record goes through the
    /// format's goblin context.
    pub fn build(self) -> Result<Vec<u8>, Error> {
        let ctx = self.format.ctx();
        let dynstr_index = 2;

        let mut dynstr = vec![0u8];
        let mut name_offsets = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            name_offsets.push(dynstr.len());
            dynstr.extend_from_slice(symbol.name.as_bytes());
            dynstr.push(0);
        }

        let mut text = SectionLayout::new(".text", SHT_PROGBITS, vec![0xc3; 16]);
        text.flags = SHF_ALLOC | SHF_EXECINSTR;
        let mut sections = vec![
            SectionLayout::new("", SHT_NULL, Vec::new()),
            text,
            SectionLayout::new(".dynstr", SHT_STRTAB, dynstr),
        ];

        if self.dynsym {
            let entry_size = self.format.symbol_size();
            let mut table = vec![0u8; entry_size * (self.symbols.len() + 1)];
            for (i, (symbol, offset)) in self.symbols.iter().zip(&name_offsets).enumerate() {
                let sym = Sym {
                    st_name: symbol.name_offset.map_or(*offset, |o| o as usize),
                    st_info: (symbol.bind << 4) | (symbol.kind & 0xf),
                    st_other: 0,
                    st_shndx: usize::from(symbol.shndx),
                    st_value: symbol.value,
                    st_size: symbol.size,
                };
                table.pwrite_with(sym, (i + 1) * entry_size, ctx)?;
            }

            let mut dynsym = SectionLayout::new(".dynsym", SHT_DYNSYM, table);
            dynsym.flags = SHF_ALLOC;
            dynsym.link = dynstr_index;
            dynsym.info = 1;
            dynsym.entry_size = entry_size;
            sections.push(dynsym);
        }

        if self.dynamic {
            let entry_size = Dyn::size(ctx.container);
            let mut entries = vec![0u8; entry_size * 2];
            for i in 0..2 {
                let terminator = Dyn {
                    d_tag: DT_NULL,
                    d_val: 0,
                };
                entries.pwrite_with(terminator, i * entry_size, ctx)?;
            }

            let mut dynamic = SectionLayout::new(".dynamic", SHT_DYNAMIC, entries);
            dynamic.flags = SHF_ALLOC;
            dynamic.link = dynstr_index;
            dynamic.entry_size = entry_size;
            sections.push(dynamic);
        }

        let mut shstrtab = vec![0u8];
        let mut section_names: Vec<usize> = sections.iter().map(|s| Self::intern(&mut shstrtab, s.name)).collect();
        section_names.push(Self::intern(&mut shstrtab, ".shstrtab"));
        sections.push(SectionLayout::new(".shstrtab", SHT_STRTAB, shstrtab));

        let mut offsets = Vec::with_capacity(sections.len());
        let mut cursor = Header::size(ctx);
        for section in &sections {
            offsets.push(if section.data.is_empty() { 0 } else { cursor });
            cursor += section.data.len();
        }
        let shoff = (cursor + 7) & !7;
        let shentsize = SectionHeader::size(ctx);
        let total = if self.section_table {
            shoff + shentsize * sections.len()
        } else {
            shoff
        };

        let mut buf = vec![0u8; total];
        for (section, offset) in sections.iter().zip(&offsets) {
            buf[*offset..*offset + section.data.len()].copy_from_slice(&section.data);
        }

        let mut header = Header {
            e_machine: if self.format.is_64() { EM_X86_64 } else { EM_386 },
            ..Header::new(ctx)
        };
        if self.section_table {
            header.e_shoff = shoff as u64;
            header.e_shnum = sections.len() as u16;
            header.e_shstrndx = (sections.len() - 1) as u16;

            for (i, ((section, offset), name)) in sections.iter().zip(&offsets).zip(&section_names).enumerate() {
                let shdr = SectionHeader {
                    sh_name: *name,
                    sh_type: section.kind,
                    sh_flags: u64::from(section.flags),
                    sh_addr: 0,
                    sh_offset: *offset as u64,
                    sh_size: section.data.len() as u64,
                    sh_link: section.link,
                    sh_info: section.info,
                    sh_addralign: 1,
                    sh_entsize: section.entry_size as u64,
                };
                buf.pwrite_with(shdr, shoff + i * shentsize, ctx)?;
            }
        }
        // goblin only offers the container-aware header encoding through IntoCtx
        buf.cwrite_with(header, 0usize, ctx);

        Ok(buf)
    }

    fn intern(table: &mut Vec<u8>, name: &str) -> usize {
        if name.is_empty() {
            return 0;
        }
        let offset = table.len();
        table.extend_from_slice(name.as_bytes());
        table.push(0);
        offset
    }
}
