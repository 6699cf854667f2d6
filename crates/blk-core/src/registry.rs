//! The enum registry: named enumerations consulted by `e_<Type>` values.
//!
//! The registry is an explicit handle passed into parse/serialize calls, not
//! ambient global state — build one, register every enum your documents use,
//! then treat it as read-only for the lifetime of all parses that share it.
//! Registrations are append-only: there is no removal API, and an
//! [`EnumRef`](crate::EnumRef) stays valid as long as the registry it indexes
//! is alive.
//!
//! All registration failure modes are tolerant: the offending registration is
//! logged and skipped (or partially indexed), never an error.

use std::collections::HashMap;

use tracing::error;

/// Upper bound on registered enum types. Registrations past the bound are
/// logged and dropped.
pub const MAX_ENUMS: usize = 1024;

/// One registered enumeration: its name, the ordered `(entry name, number)`
/// pairs as given at registration, and bidirectional lookup indices.
///
/// The ordered entry list keeps every pair, including ones rejected from the
/// indices for invalid names, so entry ids stay positional.
#[derive(Debug, Default)]
pub struct EnumInfo {
    name: String,
    entries: Vec<(String, u32)>,
    id_by_name: HashMap<String, u32>,
    id_by_number: HashMap<u32, u32>,
}

impl EnumInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    /// Symbolic name of the entry with the given id.
    pub fn entry_name(&self, val_id: u32) -> Option<&str> {
        self.entries.get(val_id as usize).map(|(n, _)| n.as_str())
    }

    /// Numeric value of the entry with the given id.
    pub fn entry_number(&self, val_id: u32) -> Option<u32> {
        self.entries.get(val_id as usize).map(|&(_, v)| v)
    }
}

/// Entry names must be `[A-Za-z_]` plus digits in non-leading position.
fn is_valid_entry_name(name: &str) -> bool {
    name.chars().enumerate().all(|(i, c)| {
        c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == '_' || (c.is_ascii_digit() && i > 0)
    })
}

/// Table of registered enumerations.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    infos: Vec<EnumInfo>,
    by_name: HashMap<String, u32>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        EnumRegistry::default()
    }

    /// Registers an enum type under `name` with the given
    /// `(entry name, numeric value)` pairs.
    ///
    /// Tolerated anomalies, each logged:
    /// - `name` already registered: the original registration is kept.
    /// - [`MAX_ENUMS`] reached: the registration is dropped.
    /// - An entry name with an invalid character: the entry keeps its
    ///   positional id but is excluded from the lookup indices.
    /// - A repeated entry name or numeric value: both entries are stored; the
    ///   later one wins in the affected index.
    pub fn register(&mut self, name: &str, entries: &[(&str, u32)]) {
        if self.infos.len() >= MAX_ENUMS {
            error!("too many enums, dropping registration of {name}");
            return;
        }
        if self.by_name.contains_key(name) {
            error!("enum {name} already registered");
            return;
        }

        let mut info = EnumInfo {
            name: name.to_string(),
            ..EnumInfo::default()
        };
        for (i, &(entry_name, number)) in entries.iter().enumerate() {
            let id = i as u32;
            info.entries.push((entry_name.to_string(), number));
            if !is_valid_entry_name(entry_name) {
                error!("enum {name} entry {entry_name} has an invalid character");
                continue;
            }
            if info.id_by_name.contains_key(entry_name) {
                error!("enum {name} has repeated entry name {entry_name}");
            }
            info.id_by_name.insert(entry_name.to_string(), id);

            if info.id_by_number.contains_key(&number) {
                error!("enum {name} has repeated value {number}");
            }
            info.id_by_number.insert(number, id);
        }

        self.by_name.insert(name.to_string(), self.infos.len() as u32);
        self.infos.push(info);
    }

    /// Resolves a type name to its registry id.
    pub fn lookup_by_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn info(&self, type_id: u32) -> Option<&EnumInfo> {
        self.infos.get(type_id as usize)
    }

    /// Resolves an entry name within a type to its value id.
    pub fn value_id_by_name(&self, type_id: u32, entry_name: &str) -> Option<u32> {
        self.info(type_id)?.id_by_name.get(entry_name).copied()
    }

    /// Resolves a numeric value within a type to its value id.
    pub fn value_id_by_number(&self, type_id: u32, number: u32) -> Option<u32> {
        self.info(type_id)?.id_by_number.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}
