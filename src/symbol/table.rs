// Thu Oct 15 2026 - Alex

use crate::object::reader::{read_cstr, slice_at};
use crate::object::{BinaryObject, ElfFormat, Section};
use crate::symbol::SymbolError;
use goblin::elf::section_header::{SHN_UNDEF, SHT_DYNAMIC, SHT_STRTAB};
use goblin::elf::sym::{Sym, STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_OBJECT};
use scroll::Pread;
use std::borrow::Cow;
use std::fmt;

pub const DYNSYM_SECTION: &str = ".dynsym";
pub const DYNSTR_SECTION: &str = ".dynstr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Object,
    Other,
}

impl SymbolKind {
    pub fn from_st_type(st_type: u8) -> Self {
        match st_type {
            STT_FUNC => SymbolKind::Function,
            STT_OBJECT => SymbolKind::Object,
            _ => SymbolKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other,
}

impl SymbolBinding {
    pub fn from_st_bind(st_bind: u8) -> Self {
        match st_bind {
            STB_LOCAL => SymbolBinding::Local,
            STB_GLOBAL => SymbolBinding::Global,
            STB_WEAK => SymbolBinding::Weak,
            _ => SymbolBinding::Other,
        }
    }
}

/// One decoded `.dynsym` entry. Borrows its name from the object's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicSymbolEntry<'a> {
    pub name: &'a [u8],
    pub defined: bool,
    pub kind: SymbolKind,
    pub value: u64,
    pub binding: SymbolBinding,
    pub size: u64,
}

impl<'a> DynamicSymbolEntry<'a> {
    fn from_sym(name: &'a [u8], sym: &Sym) -> Self {
        Self {
            name,
            defined: sym.st_shndx != SHN_UNDEF as usize,
            kind: SymbolKind::from_st_type(sym.st_type()),
            value: sym.st_value,
            binding: SymbolBinding::from_st_bind(sym.st_bind()),
            size: sym.st_size,
        }
    }

    pub fn name_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.name)
    }
}

impl fmt::Display for DynamicSymbolEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?} {:?}", self.name_lossy(), self.binding, self.kind)?;
        if self.defined {
            write!(f, " @ 0x{:x}]", self.value)
        } else {
            write!(f, " undefined]")
        }
    }
}

/// The dynamic symbol table of one object: where `.dynsym` sits in the file and
/// which string table names its entries.
#[derive(Clone, Copy)]
pub struct DynamicSymbols<'a> {
    bytes: &'a [u8],
    format: ElfFormat,
    offset: usize,
    count: usize,
    strings: &'a [u8],
}

/// Finds the dynamic symbol table of `object`.
///
/// An object without a `SHT_DYNAMIC` section, without a `.dynsym` section, or
/// without a string table for it has nothing to export and yields `None`.
pub fn locate_dynsym(object: &BinaryObject) -> Option<DynamicSymbols<'_>> {
    object.section_by_type(SHT_DYNAMIC)?;
    let dynsym = object.section_by_name(DYNSYM_SECTION)?;
    let strtab = linked_string_table(object, dynsym).or_else(|| object.section_by_name(DYNSTR_SECTION))?;

    DynamicSymbols::new(object.data(), object.format(), dynsym, strtab)
}

fn linked_string_table<'o>(object: &'o BinaryObject, dynsym: &Section) -> Option<&'o Section> {
    if dynsym.link == 0 {
        return None;
    }
    object
        .section(dynsym.link as usize)
        .filter(|section| section.kind == SHT_STRTAB)
}

impl<'a> DynamicSymbols<'a> {
    fn new(bytes: &'a [u8], format: ElfFormat, dynsym: &Section, strtab: &Section) -> Option<Self> {
        let offset = usize::try_from(dynsym.offset).ok()?;
        let size = usize::try_from(dynsym.size).ok()?;

        // a string table running past the end of the file is cut short here;
        // names that land beyond the cut surface as corrupt entries
        let strings = slice_at(bytes, strtab.offset, strtab.size).unwrap_or_else(|| {
            usize::try_from(strtab.offset)
                .ok()
                .and_then(|start| bytes.get(start..))
                .unwrap_or(&[])
        });

        Some(Self {
            bytes,
            format,
            offset,
            count: size / format.symbol_size(),
            strings,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn format(&self) -> ElfFormat {
        self.format
    }

    pub fn entry(&self, index: usize) -> Result<DynamicSymbolEntry<'a>, SymbolError> {
        let corrupt = |reason: String| SymbolError::Corrupt { index, reason };

        let offset = index
            .checked_mul(self.format.symbol_size())
            .and_then(|relative| relative.checked_add(self.offset))
            .ok_or_else(|| corrupt("entry offset overflows".to_string()))?;
        let sym: Sym = self
            .bytes
            .pread_with(offset, self.format.ctx())
            .map_err(|e: goblin::error::Error| corrupt(e.to_string()))?;
        let name = read_cstr(self.strings, sym.st_name).ok_or_else(|| {
            corrupt(format!(
                "name offset {} outside string table of {} bytes",
                sym.st_name,
                self.strings.len()
            ))
        })?;

        Ok(DynamicSymbolEntry::from_sym(name, &sym))
    }

    /// Entries in on-disk order. Each call starts over from the first entry.
    pub fn entries(&self) -> SymbolEntries<'a> {
        SymbolEntries {
            table: *self,
            next: 0,
            failed: false,
        }
    }
}

impl fmt::Debug for DynamicSymbols<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicSymbols")
            .field("format", &self.format)
            .field("offset", &self.offset)
            .field("count", &self.count)
            .finish()
    }
}

pub struct SymbolEntries<'a> {
    table: DynamicSymbols<'a>,
    next: usize,
    failed: bool,
}

impl<'a> Iterator for SymbolEntries<'a> {
    type Item = Result<DynamicSymbolEntry<'a>, SymbolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.table.count {
            return None;
        }

        let index = self.next;
        self.next += 1;

        let entry = self.table.entry(index);
        if entry.is_err() {
            self.failed = true;
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.table.count - self.next))
        }
    }
}

impl std::iter::FusedIterator for SymbolEntries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{ElfBuilder, TestSymbol};

    fn open(builder: ElfBuilder) -> BinaryObject {
        BinaryObject::parse("lib.so", builder.build().unwrap()).unwrap()
    }

    #[test]
    fn test_entries_in_disk_order() {
        let object = open(ElfBuilder::shared_object().symbols([
            TestSymbol::import("malloc"),
            TestSymbol::function("puts", 0x1040),
            TestSymbol::object("environ", 0x4000),
        ]));
        let table = locate_dynsym(&object).unwrap();
        assert_eq!(table.len(), 4);

        let names: Vec<_> = table.entries().map(|e| e.unwrap().name_lossy().into_owned()).collect();
        assert_eq!(names, vec!["", "malloc", "puts", "environ"]);

        let restarted: Vec<_> = table.entries().map(|e| e.unwrap()).collect();
        assert_eq!(restarted.len(), 4);
        assert_eq!(restarted[2].kind, SymbolKind::Function);
        assert_eq!(restarted[2].value, 0x1040);
        assert!(restarted[2].defined);
        assert!(!restarted[1].defined);
        assert_eq!(restarted[3].kind, SymbolKind::Object);
    }

    #[test]
    fn test_decodes_every_format() {
        for format in [
            ElfFormat::Elf32Le,
            ElfFormat::Elf32Be,
            ElfFormat::Elf64Le,
            ElfFormat::Elf64Be,
        ] {
            let object = open(
                ElfBuilder::new(format)
                    .symbol(TestSymbol::function("puts", 0x8000_1234).weak()),
            );
            let entry = locate_dynsym(&object).unwrap().entry(1).unwrap();
            assert_eq!(entry.name, b"puts", "{}", format);
            assert_eq!(entry.value, 0x8000_1234, "{}", format);
            assert_eq!(entry.binding, SymbolBinding::Weak, "{}", format);
            assert_eq!(entry.kind, SymbolKind::Function, "{}", format);
        }
    }

    #[test]
    fn test_no_dynamic_section() {
        let object = open(
            ElfBuilder::shared_object()
                .symbol(TestSymbol::function("puts", 0x1040))
                .without_dynamic(),
        );
        assert!(locate_dynsym(&object).is_none());
    }

    #[test]
    fn test_no_dynsym_section() {
        let object = open(ElfBuilder::shared_object().without_dynsym());
        assert!(locate_dynsym(&object).is_none());
    }

    #[test]
    fn test_no_sections_at_all() {
        let object = open(ElfBuilder::shared_object().without_section_table());
        assert!(object.sections().is_empty());
        assert!(locate_dynsym(&object).is_none());
    }

    #[test]
    fn test_corrupt_entry_ends_iteration() {
        let object = open(ElfBuilder::shared_object().symbols([
            TestSymbol::function("first", 0x1000),
            TestSymbol::function("broken", 0x1010).with_name_offset(0xffff),
            TestSymbol::function("never_seen", 0x1020),
        ]));
        let table = locate_dynsym(&object).unwrap();
        let results: Vec<_> = table.entries().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(results[2].as_ref().unwrap_err().index(), 2);
    }

    #[test]
    fn test_ifunc_is_not_a_function() {
        assert_eq!(SymbolKind::from_st_type(goblin::elf::sym::STT_GNU_IFUNC), SymbolKind::Other);
        assert_eq!(SymbolKind::from_st_type(STT_FUNC), SymbolKind::Function);
    }
}
