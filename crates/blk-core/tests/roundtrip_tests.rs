//! Serializer layout and parse/serialize round-trip tests.

use blk_core::{
    parse_str, serialize_block, Block, EnumRegistry, Float2, Int3, Mat4, Parser, Value,
};

fn registry() -> EnumRegistry {
    let mut r = EnumRegistry::new();
    r.register("Color", &[("RED", 0), ("GREEN", 1), ("BLUE", 2)]);
    r
}

fn roundtrip(b: &Block, reg: &EnumRegistry) -> Block {
    let text = serialize_block(b, reg);
    parse_str(&text, reg).unwrap_or_else(|e| panic!("re-parse failed: {e}\n---\n{text}\n---"))
}

// ============================================================================
// Exact canonical layout
// ============================================================================

#[test]
fn canonical_layout_is_flat() {
    let reg = registry();
    let b = parse_str("{ a:i = 5 sub { x:r = 1.5 } }", &reg).unwrap();
    let text = serialize_block(&b, &reg);
    assert_eq!(text, "{\na:i = 5\nsub {\nx:r = 1.5\n}\n}");
}

#[test]
fn tag_serializes_without_value() {
    let reg = registry();
    let mut b = Block::new();
    b.add_value("marker", Value::Empty);
    assert_eq!(serialize_block(&b, &reg), "{\nmarker:tag\n}");
}

#[test]
fn unsigned_always_serializes_as_u64() {
    let reg = registry();
    let b = parse_str("{ n:u = 7 }", &reg).unwrap();
    assert_eq!(serialize_block(&b, &reg), "{\nn:u64 = 7\n}");
}

#[test]
fn string_reescapes_on_output() {
    let reg = registry();
    let b = parse_str("{ s:s = \"line1\\nline2\" }", &reg).unwrap();
    // The decoded newline byte goes back out as the two characters \n.
    assert_eq!(serialize_block(&b, &reg), "{\ns:s = \"line1\\nline2\"\n}");
}

#[test]
fn control_chars_serialize_as_uppercase_hex() {
    let reg = registry();
    let mut b = Block::new();
    b.add_string("s", "\u{01}\u{1F}");
    assert_eq!(serialize_block(&b, &reg), "{\ns:s = \"\\x01\\x1F\"\n}");
}

#[test]
fn matrix_grouping_has_column_gaps() {
    let reg = registry();
    let b = parse_str(
        "{ m:m4 = 1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1 }",
        &reg,
    )
    .unwrap();
    let text = serialize_block(&b, &reg);
    assert_eq!(
        text,
        "{\nm:m4 = 1, 0, 0, 0,   0, 1, 0, 0,   0, 0, 1, 0,   0, 0, 0, 1  \n}"
    );
}

#[test]
fn enum_serializes_member_name() {
    let reg = registry();
    let b = parse_str("{ c:e_Color = BLUE }", &reg).unwrap();
    assert_eq!(serialize_block(&b, &reg), "{\nc:e_Color = BLUE\n}");
}

#[test]
fn unresolvable_enum_serializes_as_unknown() {
    let empty = EnumRegistry::new();
    let report = Parser::new("{ c:e_Color = RED }", &empty).parse_document();
    let text = serialize_block(&report.root, &empty);
    assert_eq!(text, "{\nc:e_Unknown = Unknown\n}");
}

#[test]
fn empty_array_layout() {
    let reg = registry();
    let b = parse_str("{ a:arr = { } }", &reg).unwrap();
    assert_eq!(serialize_block(&b, &reg), "{\na:arr = {  }\n}");
}

// ============================================================================
// Round-trip structural equality
// ============================================================================

#[test]
fn roundtrip_scalars() {
    let reg = registry();
    let mut b = Block::new();
    b.add_bool("flag", true);
    b.add_int("count", -42);
    b.add_uint64("big", u64::MAX);
    b.add_double("ratio", 0.1);
    b.add_string("name", "hero");
    b.add_value("marker", Value::Empty);
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_vectors_and_matrix() {
    let reg = registry();
    let mut b = Block::new();
    b.add_vec2("v2", Float2::new(1.25, -3.5));
    b.add_ivec3("i3", Int3::new(-1, 0, 7));
    let mut cols = [0.0f32; 16];
    for (i, c) in cols.iter_mut().enumerate() {
        *c = i as f32 * 0.5;
    }
    b.add_mat4("m", Mat4::from_cols(cols));
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_full_precision_doubles() {
    let reg = registry();
    let mut b = Block::new();
    b.add_double("pi", std::f64::consts::PI);
    b.add_double("tiny", 1e-300);
    b.add_double("third", 1.0 / 3.0);
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_arrays() {
    let reg = registry();
    let mut b = Block::new();
    b.add_arr_f64("nums", &[1.0, 2.5, -3.0]);
    b.add_arr_str("strs", &["plain", "with \"quotes\"", "multi\nline"]);
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_nested_blocks_and_enums() {
    let reg = registry();
    let mut inner = Block::new();
    inner.add_enum("c", "Color", 2, &reg);
    inner.add_int("depth", 2);
    let mut b = Block::new();
    b.add_int("top", 1);
    b.add_block("inner", inner);
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_duplicate_names() {
    let reg = registry();
    let mut b = Block::new();
    b.add_int("a", 1);
    b.add_int("a", 2);
    b.add_string("a", "third");
    assert_eq!(roundtrip(&b, &reg), b);
}

#[test]
fn roundtrip_strings_with_every_control_byte() {
    let reg = registry();
    let all_controls: String = (1u8..32).map(|b| b as char).collect();
    let mut b = Block::new();
    b.add_string("s", &all_controls);
    assert_eq!(roundtrip(&b, &reg), b);
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn extends_resolves_against_earlier_siblings() {
    let reg = registry();
    let b = parse_str(
        "{ base{ x:i=1 y:i=2 } child extends base { y:i=9 z:i=3 } }",
        &reg,
    )
    .unwrap();
    let child = b.get_block("child").unwrap();
    assert_eq!(child.get_int("x", 0), 1);
    assert_eq!(child.get_int("y", 0), 9);
    assert_eq!(child.get_int("z", 0), 3);
}

#[test]
fn extends_target_may_be_a_dotted_path() {
    let reg = registry();
    let b = parse_str(
        "{ lib { base { x:i = 1 } } child extends lib.base { y:i = 2 } }",
        &reg,
    )
    .unwrap();
    let child = b.get_block("child").unwrap();
    assert_eq!(child.get_int("x", 0), 1);
    assert_eq!(child.get_int("y", 0), 2);
}

#[test]
fn extends_sees_base_inside_open_ancestor() {
    // `group` is still open where the lookup runs, but `base` itself has
    // closed and is reachable through the live tree.
    let reg = registry();
    let report = Parser::new(
        "{ group { base { x:i = 1 } child extends group.base { y:i = 2 } } }",
        &reg,
    )
    .parse_document();
    assert!(report.ok());
    assert!(report.diagnostics.is_empty());
    let child = report.root.get_block_rec("group.child").unwrap();
    assert_eq!(child.get_int("x", 0), 1);
    assert_eq!(child.get_int("y", 0), 2);
}

#[test]
fn extends_missing_base_still_parses() {
    let reg = registry();
    let report = Parser::new("{ child extends nope { y:i = 9 } }", &reg).parse_document();
    assert!(report.ok());
    assert_eq!(report.root.get_block("child").unwrap().get_int("y", 0), 9);
    assert!(!report.diagnostics.is_empty());
}

#[test]
fn extended_block_roundtrips_in_resolved_form() {
    let reg = registry();
    let b = parse_str(
        "{ base{ x:i=1 } child extends base { y:i=2 } }",
        &reg,
    )
    .unwrap();
    // Serialization writes the merged result, not the extends directive.
    let text = serialize_block(&b, &reg);
    assert!(!text.contains("extends"));
    assert_eq!(roundtrip(&b, &reg), b);
}
