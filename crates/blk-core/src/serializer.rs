//! Canonical text serializer.
//!
//! Output is deliberately flat: every block body is `{`, one `name:value`
//! line per entry, `}`. No indentation is emitted at any nesting depth.
//! Numbers use the shortest decimal form that parses back to the same
//! value, strings are escaped with [`encode_escapes`], and matrices are
//! written column by column with a double-space gap after each column, so
//! `parse(serialize(tree)) == tree` for any tree built from typed setters.

use crate::block::Block;
use crate::escape::encode_escapes;
use crate::registry::EnumRegistry;
use crate::value::{DataArray, EnumRef, Value};

/// Serializes `block` as a complete document (the outermost braces are the
/// document delimiters). Enum values are rendered through `registry`; an
/// [`EnumRef`] the registry cannot resolve prints as the member `Unknown`.
pub fn serialize_block(block: &Block, registry: &EnumRegistry) -> String {
    let mut out = String::new();
    write_block(&mut out, block, registry);
    out
}

fn write_block(out: &mut String, block: &Block, registry: &EnumRegistry) {
    out.push_str("{\n");
    for entry in block.entries() {
        out.push_str(&entry.name);
        write_value(out, &entry.value, registry);
        out.push('\n');
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value, registry: &EnumRegistry) {
    match value {
        Value::Empty => out.push_str(":tag"),
        Value::Bool(b) => {
            out.push_str(":b = ");
            out.push_str(if *b { "true" } else { "false" });
        }
        Value::Int(i) => {
            out.push_str(":i = ");
            out.push_str(&i.to_string());
        }
        Value::Uint64(u) => {
            out.push_str(":u64 = ");
            out.push_str(&u.to_string());
        }
        Value::Double(d) => {
            out.push_str(":r = ");
            out.push_str(&d.to_string());
        }
        Value::Vec2(v) => {
            out.push_str(":p2 = ");
            write_floats(out, &[v.x, v.y]);
        }
        Value::Vec3(v) => {
            out.push_str(":p3 = ");
            write_floats(out, &[v.x, v.y, v.z]);
        }
        Value::Vec4(v) => {
            out.push_str(":p4 = ");
            write_floats(out, &[v.x, v.y, v.z, v.w]);
        }
        Value::IVec2(v) => {
            out.push_str(":i2 = ");
            write_ints(out, &[v.x, v.y]);
        }
        Value::IVec3(v) => {
            out.push_str(":i3 = ");
            write_ints(out, &[v.x, v.y, v.z]);
        }
        Value::IVec4(v) => {
            out.push_str(":i4 = ");
            write_ints(out, &[v.x, v.y, v.z, v.w]);
        }
        Value::Mat4(m) => {
            out.push_str(":m4 = ");
            // Column order: a double-space gap closes each group of four,
            // including the last (the line ends with two spaces).
            for (k, f) in m.m.iter().enumerate() {
                out.push_str(&f.to_string());
                if k < 15 {
                    out.push_str(", ");
                }
                if k % 4 == 3 {
                    out.push_str("  ");
                }
            }
        }
        Value::Enum(e) => write_enum(out, e, registry),
        Value::Str(s) => {
            out.push_str(":s = \"");
            out.push_str(&encode_escapes(s));
            out.push('"');
        }
        Value::Array(a) => {
            out.push_str(":arr = ");
            write_array(out, a);
        }
        Value::Block(b) => {
            out.push(' ');
            write_block(out, b, registry);
        }
    }
}

fn write_enum(out: &mut String, e: &EnumRef, registry: &EnumRegistry) {
    let info = registry.info(e.type_id);
    let type_name = info.map(|i| i.name()).unwrap_or("Unknown");
    let member = info
        .and_then(|i| i.entry_name(e.val_id))
        .unwrap_or("Unknown");
    out.push_str(":e_");
    out.push_str(type_name);
    out.push_str(" = ");
    out.push_str(member);
}

/// Elements are rendered by their own kind, so an array that kept a
/// mismatched element still produces text that parses back to the same
/// values (the re-parse will log the same mismatch).
fn write_array(out: &mut String, arr: &DataArray) {
    out.push_str("{ ");
    for (i, v) in arr.values.iter().enumerate() {
        match v {
            Value::Str(s) => {
                out.push('"');
                out.push_str(&encode_escapes(s));
                out.push('"');
            }
            Value::Double(d) => out.push_str(&d.to_string()),
            // Array slots only ever hold Double or Str when built by the
            // parser; anything else placed by hand prints as its closest
            // numeric form.
            other => out.push_str(&to_double(other).to_string()),
        }
        if i + 1 < arr.values.len() {
            out.push_str(", ");
        }
    }
    out.push_str(" }");
}

fn to_double(v: &Value) -> f64 {
    match v {
        Value::Double(d) => *d,
        Value::Int(i) => *i as f64,
        Value::Uint64(u) => *u as f64,
        Value::Bool(b) => *b as u8 as f64,
        _ => 0.0,
    }
}

fn write_floats(out: &mut String, vals: &[f32]) {
    for (i, v) in vals.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&v.to_string());
    }
}

fn write_ints(out: &mut String, vals: &[i32]) {
    for (i, v) in vals.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&v.to_string());
    }
}
