//! The `Block` container: an ordered, duplicate-name-tolerant sequence of
//! named, typed values.
//!
//! Entry order is insertion order and is what the serializer emits. Names
//! need not be unique: `get_id` finds the first match, `get_next_id` walks
//! the rest. Every typed accessor follows the same contract: `get_*` returns
//! the caller's default whenever the name is absent *or* present with a
//! different kind (never an error), `add_*` always appends, and `set_*`
//! replaces the first same-named entry in place or appends when absent.
//!
//! A `Block` owns every value it holds; `Clone` deep-copies the whole tree.

use tracing::error;

use crate::math::{Float2, Float3, Float4, Int2, Int3, Int4, Mat4};
use crate::registry::EnumRegistry;
use crate::value::{DataArray, EnumRef, Value, ValueKind};

/// A single `(name, value)` pair of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub value: Value,
}

/// An ordered sequence of named, typed values; the unit of nesting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    entries: Vec<Entry>,
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, releasing owned payloads.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Index of the first entry named `name`.
    pub fn get_id(&self, name: &str) -> Option<usize> {
        self.get_next_id(name, 0)
    }

    /// Index of the first entry named `name` at or after `pos`, for walking
    /// duplicate names.
    pub fn get_next_id(&self, name: &str, pos: usize) -> Option<usize> {
        self.entries
            .iter()
            .skip(pos)
            .position(|e| e.name == name)
            .map(|off| pos + off)
    }

    pub fn get_name(&self, id: usize) -> Option<&str> {
        self.entries.get(id).map(|e| e.name.as_str())
    }

    /// Kind of the entry at `id`, or `Empty` when out of range.
    pub fn get_kind(&self, id: usize) -> ValueKind {
        self.entries
            .get(id)
            .map(|e| e.value.kind())
            .unwrap_or(ValueKind::Empty)
    }

    /// Kind of the first entry named `name`, or `Empty` when absent.
    pub fn get_kind_by_name(&self, name: &str) -> ValueKind {
        self.get_id(name)
            .map(|id| self.get_kind(id))
            .unwrap_or(ValueKind::Empty)
    }

    pub fn value(&self, id: usize) -> Option<&Value> {
        self.entries.get(id).map(|e| &e.value)
    }

    /// Whether an entry named `name` exists and is a tag-only marker.
    pub fn has_tag(&self, name: &str) -> bool {
        matches!(
            self.get_id(name).and_then(|id| self.value(id)),
            Some(Value::Empty)
        )
    }

    /// Appends an entry. Duplicate names are permitted.
    pub fn add_value(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push(Entry {
            name: name.into(),
            value,
        });
    }

    /// Replaces the first entry named `name` in place, preserving its
    /// position, or appends when absent.
    pub fn set_value(&mut self, name: &str, value: Value) {
        match self.get_id(name) {
            Some(id) => self.entries[id].value = value,
            None => self.add_value(name, value),
        }
    }

    /// Moves every entry of `other` onto the end of this block, leaving
    /// `other` empty. Used for `#include` splicing.
    pub fn append_from(&mut self, other: &mut Block) {
        self.entries.append(&mut other.entries);
    }

    pub(crate) fn push_entry(&mut self, name: String, value: Value) {
        self.entries.push(Entry { name, value });
    }

    pub(crate) fn child_block_mut(&mut self, id: usize) -> Option<&mut Block> {
        match self.entries.get_mut(id).map(|e| &mut e.value) {
            Some(Value::Block(b)) => Some(b),
            _ => None,
        }
    }

    /// Walks `path` as a chain of entry indices, each of which must hold a
    /// block. Lets the parser address the block it is filling while keeping
    /// the whole tree reachable from the root.
    pub(crate) fn block_at_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        let mut cur = self;
        for &id in path {
            cur = cur.child_block_mut(id)?;
        }
        Some(cur)
    }
}

/// Generates the `get_*(name, default)` / `get_*_at(id, default)` /
/// `add_*` / `set_*` family for one inline payload kind.
macro_rules! scalar_accessors {
    ($get:ident, $get_at:ident, $add:ident, $set:ident, $variant:ident, $ty:ty) => {
        impl Block {
            pub fn $get_at(&self, id: usize, default: $ty) -> $ty {
                match self.value(id) {
                    Some(Value::$variant(v)) => *v,
                    _ => default,
                }
            }

            pub fn $get(&self, name: &str, default: $ty) -> $ty {
                match self.get_id(name) {
                    Some(id) => self.$get_at(id, default),
                    None => default,
                }
            }

            pub fn $add(&mut self, name: &str, value: $ty) {
                self.add_value(name, Value::$variant(value));
            }

            pub fn $set(&mut self, name: &str, value: $ty) {
                self.set_value(name, Value::$variant(value));
            }
        }
    };
}

scalar_accessors!(get_bool, get_bool_at, add_bool, set_bool, Bool, bool);
scalar_accessors!(get_int, get_int_at, add_int, set_int, Int, i64);
scalar_accessors!(get_uint64, get_uint64_at, add_uint64, set_uint64, Uint64, u64);
scalar_accessors!(get_double, get_double_at, add_double, set_double, Double, f64);
scalar_accessors!(get_vec2, get_vec2_at, add_vec2, set_vec2, Vec2, Float2);
scalar_accessors!(get_vec3, get_vec3_at, add_vec3, set_vec3, Vec3, Float3);
scalar_accessors!(get_vec4, get_vec4_at, add_vec4, set_vec4, Vec4, Float4);
scalar_accessors!(get_ivec2, get_ivec2_at, add_ivec2, set_ivec2, IVec2, Int2);
scalar_accessors!(get_ivec3, get_ivec3_at, add_ivec3, set_ivec3, IVec3, Int3);
scalar_accessors!(get_ivec4, get_ivec4_at, add_ivec4, set_ivec4, IVec4, Int4);
scalar_accessors!(get_mat4, get_mat4_at, add_mat4, set_mat4, Mat4, Mat4);

impl Block {
    pub fn get_string_at(&self, id: usize, default: &str) -> String {
        match self.value(id) {
            Some(Value::Str(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        match self.get_id(name) {
            Some(id) => self.get_string_at(id, default),
            None => default.to_string(),
        }
    }

    pub fn add_string(&mut self, name: &str, value: impl Into<String>) {
        self.add_value(name, Value::Str(value.into()));
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.set_value(name, Value::Str(value.into()));
    }

    pub fn get_block_at(&self, id: usize) -> Option<&Block> {
        match self.value(id) {
            Some(Value::Block(b)) => Some(b),
            _ => None,
        }
    }

    pub fn get_block(&self, name: &str) -> Option<&Block> {
        self.get_id(name).and_then(|id| self.get_block_at(id))
    }

    /// Resolves a dotted path (`"a.b.c"`) through nested blocks. Each segment
    /// uses first-match semantics; `None` when any segment is missing or not
    /// a block.
    pub fn get_block_rec(&self, path: &str) -> Option<&Block> {
        match path.split_once('.') {
            None => self.get_block(path),
            Some((head, rest)) => self.get_block(head)?.get_block_rec(rest),
        }
    }

    pub fn add_block(&mut self, name: &str, block: Block) {
        self.add_value(name, Value::Block(Box::new(block)));
    }

    pub fn set_block(&mut self, name: &str, block: Block) {
        self.set_value(name, Value::Block(Box::new(block)));
    }

    /// Numeric value of an enum entry, resolved through `registry`; `default`
    /// when absent, of another kind, or dangling.
    pub fn get_enum_at(&self, id: usize, registry: &EnumRegistry, default: u32) -> u32 {
        match self.value(id) {
            Some(Value::Enum(ev)) => registry
                .info(ev.type_id)
                .and_then(|info| info.entry_number(ev.val_id))
                .unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_enum(&self, name: &str, registry: &EnumRegistry, default: u32) -> u32 {
        match self.get_id(name) {
            Some(id) => self.get_enum_at(id, registry, default),
            None => default,
        }
    }

    /// Appends an enum entry referencing `type_name`/`number` in `registry`.
    /// An unregistered type or number is logged and skipped.
    pub fn add_enum(&mut self, name: &str, type_name: &str, number: u32, registry: &EnumRegistry) {
        if let Some(ev) = enum_ref(type_name, number, registry) {
            self.add_value(name, Value::Enum(ev));
        }
    }

    pub fn set_enum(&mut self, name: &str, type_name: &str, number: u32, registry: &EnumRegistry) {
        if let Some(ev) = enum_ref(type_name, number, registry) {
            self.set_value(name, Value::Enum(ev));
        }
    }

    /// Merges the overlay block `det` onto this block ("detalization", the
    /// `extends` merge). For each overlay entry, matched by name against the
    /// first same-named entry here:
    ///
    /// - absent: the entry is appended;
    /// - present with the same kind: replaced in place — except nested
    ///   blocks, which are merged recursively;
    /// - present with a different kind: the overlay entry is dropped
    ///   silently.
    ///
    /// Idempotent: applying the same overlay twice equals applying it once.
    pub fn add_detalization(&mut self, det: &Block) {
        for entry in &det.entries {
            match self.get_id(&entry.name) {
                None => self.entries.push(entry.clone()),
                Some(id) => {
                    if self.entries[id].value.kind() != entry.value.kind() {
                        continue;
                    }
                    if let (Value::Block(base), Value::Block(overlay)) =
                        (&mut self.entries[id].value, &entry.value)
                    {
                        base.add_detalization(overlay);
                    } else {
                        self.entries[id].value = entry.value.clone();
                    }
                }
            }
        }
    }
}

fn enum_ref(type_name: &str, number: u32, registry: &EnumRegistry) -> Option<EnumRef> {
    let Some(type_id) = registry.lookup_by_name(type_name) else {
        error!("enum {type_name} is not registered");
        return None;
    };
    let Some(val_id) = registry.value_id_by_number(type_id, number) else {
        error!("enum {type_name} has no value {number}");
        return None;
    };
    Some(EnumRef { type_id, val_id })
}

/// Generates the numeric `get_arr_*` / `add_arr_*` / `set_arr_*` family.
/// Array elements are stored as `Double`; the typed views convert on the way
/// in and out.
macro_rules! numeric_array_accessors {
    ($get:ident, $add:ident, $set:ident, $ty:ty) => {
        impl Block {
            /// Copies the elements of a double array into `out`. Returns
            /// `false` (leaving `out` untouched) when the entry is absent,
            /// not an array, or not a double array. With `replace`, `out` is
            /// cleared first; otherwise elements are appended.
            pub fn $get(&self, name: &str, out: &mut Vec<$ty>, replace: bool) -> bool {
                let Some(id) = self.get_id(name) else {
                    return false;
                };
                let Some(Value::Array(arr)) = self.value(id) else {
                    return false;
                };
                if arr.elem != ValueKind::Double {
                    return false;
                }
                if replace {
                    out.clear();
                }
                for v in &arr.values {
                    match v {
                        Value::Double(d) => out.push(*d as $ty),
                        // Tolerated mixed-array leftovers read as zero.
                        _ => out.push(Default::default()),
                    }
                }
                true
            }

            pub fn $add(&mut self, name: &str, values: &[$ty]) {
                self.add_value(name, double_array(values.iter().map(|&v| v as f64)));
            }

            pub fn $set(&mut self, name: &str, values: &[$ty]) {
                self.set_value(name, double_array(values.iter().map(|&v| v as f64)));
            }
        }
    };
}

fn double_array(values: impl Iterator<Item = f64>) -> Value {
    let mut arr = DataArray::new(ValueKind::Double);
    arr.values.extend(values.map(Value::Double));
    Value::Array(arr)
}

numeric_array_accessors!(get_arr_f64, add_arr_f64, set_arr_f64, f64);
numeric_array_accessors!(get_arr_f32, add_arr_f32, set_arr_f32, f32);
numeric_array_accessors!(get_arr_i32, add_arr_i32, set_arr_i32, i32);
numeric_array_accessors!(get_arr_u32, add_arr_u32, set_arr_u32, u32);

impl Block {
    /// String-array counterpart of [`Block::get_arr_f64`].
    pub fn get_arr_str(&self, name: &str, out: &mut Vec<String>, replace: bool) -> bool {
        let Some(id) = self.get_id(name) else {
            return false;
        };
        let Some(Value::Array(arr)) = self.value(id) else {
            return false;
        };
        if arr.elem != ValueKind::String {
            return false;
        }
        if replace {
            out.clear();
        }
        for v in &arr.values {
            match v {
                Value::Str(s) => out.push(s.clone()),
                _ => out.push(String::new()),
            }
        }
        true
    }

    pub fn add_arr_str(&mut self, name: &str, values: &[impl AsRef<str>]) {
        self.add_value(name, string_array(values));
    }

    pub fn set_arr_str(&mut self, name: &str, values: &[impl AsRef<str>]) {
        self.set_value(name, string_array(values));
    }
}

fn string_array(values: &[impl AsRef<str>]) -> Value {
    let mut arr = DataArray::new(ValueKind::String);
    arr.values
        .extend(values.iter().map(|s| Value::Str(s.as_ref().to_string())));
    Value::Array(arr)
}
