// Thu Oct 15 2026 - Alex

use crate::symbol::{DynamicSymbolEntry, SymbolKind};

/// True when `entry` is a defined, addressed function named exactly `target`:
/// something a dynamic linker could bind a call to. Imports of the same name
/// do not count.
pub fn is_export_match(entry: &DynamicSymbolEntry<'_>, target: &str) -> bool {
    entry.name == target.as_bytes()
        && entry.defined
        && entry.kind == SymbolKind::Function
        && entry.value != 0
}
