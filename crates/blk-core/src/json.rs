//! Block → JSON export.
//!
//! Lossy by design: type tags collapse to JSON's number/string/bool/null,
//! vectors and matrices flatten to number arrays, and a block with repeated
//! entry names keeps only the last occurrence per name (JSON objects cannot
//! express duplicates). Use the text serializer when fidelity matters.

use serde_json::{json, Map, Number, Value as Json};

use crate::block::Block;
use crate::registry::EnumRegistry;
use crate::value::Value;

/// Converts a block tree to a `serde_json::Value` object. Entry order is
/// preserved; duplicate names within a block resolve last-wins.
pub fn block_to_json(block: &Block, registry: &EnumRegistry) -> Json {
    let mut map = Map::new();
    for entry in block.entries() {
        map.insert(entry.name.clone(), value_to_json(&entry.value, registry));
    }
    Json::Object(map)
}

fn value_to_json(value: &Value, registry: &EnumRegistry) -> Json {
    match value {
        Value::Empty => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => json!(i),
        Value::Uint64(u) => json!(u),
        Value::Double(d) => float(*d),
        Value::Vec2(v) => floats(&[v.x, v.y]),
        Value::Vec3(v) => floats(&[v.x, v.y, v.z]),
        Value::Vec4(v) => floats(&[v.x, v.y, v.z, v.w]),
        Value::IVec2(v) => json!([v.x, v.y]),
        Value::IVec3(v) => json!([v.x, v.y, v.z]),
        Value::IVec4(v) => json!([v.x, v.y, v.z, v.w]),
        Value::Mat4(m) => floats(&m.m),
        Value::Enum(e) => {
            let member = registry
                .info(e.type_id)
                .and_then(|i| i.entry_name(e.val_id))
                .unwrap_or("Unknown");
            Json::String(member.to_string())
        }
        Value::Str(s) => Json::String(s.clone()),
        Value::Array(a) => Json::Array(
            a.values
                .iter()
                .map(|v| value_to_json(v, registry))
                .collect(),
        ),
        Value::Block(b) => block_to_json(b, registry),
    }
}

// Non-finite doubles have no JSON form; they export as null.
fn float(d: f64) -> Json {
    Number::from_f64(d).map(Json::Number).unwrap_or(Json::Null)
}

fn floats(vals: &[f32]) -> Json {
    Json::Array(vals.iter().map(|&v| float(v as f64)).collect())
}
