//! Property-based round-trip tests.
//!
//! Random block trees built through the typed `add_*` API must survive
//! `parse(serialize(tree))` with structural equality, and the escape codec
//! must be lossless for arbitrary strings.
//!
//! Exclusions mirror the documented tolerances rather than bugs:
//! - NaN/Infinity doubles (no text form).
//! - Mixed-type arrays (kept on parse, but declared lossy).
//! - Enum refs pointing outside the registry (serialize as `Unknown`).

use proptest::prelude::*;

use blk_core::{
    decode_escapes, encode_escapes, parse_str, serialize_block, Block, EnumRegistry, Float2,
    Float3, Float4, Int2, Int3, Int4, Mat4,
};

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_.]{0,12}").unwrap()
}

fn arb_finite_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e9f64..1e9,
        Just(0.0),
        Just(-0.0),
        Just(1.0 / 3.0),
        Just(f64::MIN_POSITIVE),
    ]
}

fn arb_finite_f32() -> impl Strategy<Value = f32> {
    prop_oneof![-1e6f32..1e6, Just(0.0f32), Just(0.1f32)]
}

/// Any string, printable or not: control bytes, unicode, quotes, backslashes.
fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,20}",
        "[\\x00-\\x1F]{0,8}",
        "\\PC{0,10}",
        Just("\\".to_string()),
        Just("\"".to_string()),
        Just("a\\x41b".to_string()),
    ]
}

#[derive(Debug, Clone)]
enum Leaf {
    Bool(bool),
    Int(i64),
    Uint64(u64),
    Double(f64),
    Vec2(f32, f32),
    Vec3(f32, f32, f32),
    Vec4(f32, f32, f32, f32),
    IVec2(i32, i32),
    IVec3(i32, i32, i32),
    IVec4(i32, i32, i32, i32),
    Mat4([f32; 16]),
    Str(String),
    Tag,
    NumArray(Vec<f64>),
    StrArray(Vec<String>),
}

fn arb_leaf() -> impl Strategy<Value = Leaf> {
    let f = arb_finite_f32;
    prop_oneof![
        any::<bool>().prop_map(Leaf::Bool),
        any::<i64>().prop_map(Leaf::Int),
        any::<u64>().prop_map(Leaf::Uint64),
        arb_finite_f64().prop_map(Leaf::Double),
        (f(), f()).prop_map(|(x, y)| Leaf::Vec2(x, y)),
        (f(), f(), f()).prop_map(|(x, y, z)| Leaf::Vec3(x, y, z)),
        (f(), f(), f(), f()).prop_map(|(x, y, z, w)| Leaf::Vec4(x, y, z, w)),
        (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Leaf::IVec2(x, y)),
        (any::<i32>(), any::<i32>(), any::<i32>()).prop_map(|(x, y, z)| Leaf::IVec3(x, y, z)),
        (any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>())
            .prop_map(|(x, y, z, w)| Leaf::IVec4(x, y, z, w)),
        prop::array::uniform16(f()).prop_map(Leaf::Mat4),
        arb_string().prop_map(Leaf::Str),
        Just(Leaf::Tag),
        prop::collection::vec(arb_finite_f64(), 0..6).prop_map(Leaf::NumArray),
        // Non-empty: an empty array's declared kind is not recoverable from
        // text (it always re-parses as a numeric array).
        prop::collection::vec(arb_string(), 1..4).prop_map(Leaf::StrArray),
    ]
}

fn add_leaf(b: &mut Block, name: &str, leaf: &Leaf) {
    match leaf {
        Leaf::Bool(v) => b.add_bool(name, *v),
        Leaf::Int(v) => b.add_int(name, *v),
        Leaf::Uint64(v) => b.add_uint64(name, *v),
        Leaf::Double(v) => b.add_double(name, *v),
        Leaf::Vec2(x, y) => b.add_vec2(name, Float2::new(*x, *y)),
        Leaf::Vec3(x, y, z) => b.add_vec3(name, Float3::new(*x, *y, *z)),
        Leaf::Vec4(x, y, z, w) => b.add_vec4(name, Float4::new(*x, *y, *z, *w)),
        Leaf::IVec2(x, y) => b.add_ivec2(name, Int2::new(*x, *y)),
        Leaf::IVec3(x, y, z) => b.add_ivec3(name, Int3::new(*x, *y, *z)),
        Leaf::IVec4(x, y, z, w) => b.add_ivec4(name, Int4::new(*x, *y, *z, *w)),
        Leaf::Mat4(m) => b.add_mat4(name, Mat4::from_cols(*m)),
        Leaf::Str(s) => b.add_string(name, s.clone()),
        Leaf::Tag => b.add_value(name, blk_core::Value::Empty),
        Leaf::NumArray(v) => b.add_arr_f64(name, v),
        Leaf::StrArray(v) => b.add_arr_str(name, v),
    }
}

/// A flat list of leaves plus nested children, up to 3 levels deep.
fn arb_tree() -> impl Strategy<Value = Block> {
    let leaves = prop::collection::vec((arb_name(), arb_leaf()), 0..8);
    let flat = leaves.prop_map(|items| {
        let mut b = Block::new();
        for (name, leaf) in &items {
            add_leaf(&mut b, name, leaf);
        }
        b
    });
    flat.prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec((arb_name(), arb_leaf()), 0..6),
            prop::collection::vec((arb_name(), inner), 0..3),
        )
            .prop_map(|(items, children)| {
                let mut b = Block::new();
                for (name, leaf) in &items {
                    add_leaf(&mut b, name, leaf);
                }
                for (name, child) in children {
                    b.add_block(&name, child);
                }
                b
            })
    })
}

proptest! {
    #[test]
    fn prop_tree_roundtrips(tree in arb_tree()) {
        let reg = EnumRegistry::new();
        let text = serialize_block(&tree, &reg);
        let back = parse_str(&text, &reg).unwrap();
        prop_assert_eq!(back, tree);
    }

    #[test]
    fn prop_escape_roundtrips(s in arb_string()) {
        let encoded = encode_escapes(&s);
        let decoded = decode_escapes(&encoded);
        prop_assert_eq!(decoded.as_ref(), s.as_str());
    }

    #[test]
    fn prop_escape_roundtrips_any_string(s in any::<String>()) {
        let encoded = encode_escapes(&s);
        let decoded = decode_escapes(&encoded);
        prop_assert_eq!(decoded.as_ref(), s.as_str());
    }

    #[test]
    fn prop_encoded_strings_have_no_raw_specials(s in arb_string()) {
        let encoded = encode_escapes(&s);
        prop_assert!(!encoded.contains('\n'));
        prop_assert!(!encoded.contains('"') || encoded.contains("\\\""));
        for c in encoded.chars() {
            prop_assert!((c as u32) >= 0x20);
        }
    }
}
