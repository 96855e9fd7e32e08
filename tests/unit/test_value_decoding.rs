//! Unit Tests for Value Decoding
//!
//! Literal forms the engine prints for `get`, and how they display.

use ucli_driver::Value;

fn shown(text: &str) -> String {
    Value::decode(text).to_string()
}

#[test]
fn test_known_bits_display_as_hex() {
    assert_eq!(shown("'b0"), "0x0");
    assert_eq!(shown("'b1"), "0x1");
    assert_eq!(shown("'b10000"), "0x10");
    assert_eq!(shown("16'h00_ff"), "0xff");
    assert_eq!(shown("6'o77"), "0x3f");
    assert_eq!(shown("8'sb1111_1111"), "0xff");
}

#[test]
fn test_wide_vectors() {
    let bits = "1".repeat(200);
    let value = Value::decode(&format!("'b{}", bits));
    assert!(value.is_known());
    assert_eq!(value.as_u128(), None);
    assert_eq!(value.to_string(), format!("0x{}", "f".repeat(50)));
}

#[test]
fn test_unknown_bits_display_verbatim() {
    assert_eq!(shown("'bxx"), "xx");
    assert_eq!(shown("'bz"), "z");
    assert_eq!(shown("4'hz"), "zzzz");
    assert_eq!(shown("'b10x1"), "10x1");
    assert_eq!(shown("'oX"), "xxx");
}

#[test]
fn test_numeric_value() {
    assert_eq!(Value::decode("'b0").as_u128(), Some(0));
    assert_eq!(Value::decode("'b101").as_u128(), Some(5));
    assert_eq!(Value::decode("'hdead_beef").as_u128(), Some(0xdead_beef));
    assert_eq!(Value::decode("'bx1").as_u128(), None);
    assert_eq!(Value::decode("hello").as_u128(), None);
}

#[test]
fn test_records_display_as_fields() {
    assert_eq!(
        shown("((opcode => 'h3, valid => 'b1, payload => 'bxxxx))"),
        "{opcode: 0x3, valid: 0x1, payload: xxxx}"
    );
    assert_eq!(shown("(())"), "{}");

    let value = Value::decode("((a => 'b1, b => 'bz))");
    assert!(!value.is_known());
}

#[test]
fn test_nested_records() {
    let value = Value::decode("((req => ((addr => 'h10, we => 'b0)), ack => 'b1))");
    match &value {
        Value::Struct(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].0, "req");
            assert!(matches!(fields[0].1, Value::Struct(ref inner) if inner.len() == 2));
        }
        other => panic!("expected a record, got {:?}", other),
    }
    assert_eq!(value.to_string(), "{req: {addr: 0x10, we: 0x0}, ack: 0x1}");
}

#[test]
fn test_unrecognised_text_is_scalar() {
    for text in ["42", "3.14", "\"text\"", "'q123", "x'b1", "((a => 'b1", "((a 'b1))"] {
        assert_eq!(Value::decode(text), Value::Scalar(text.to_string()), "{}", text);
    }
    assert_eq!(shown("  8'd255  "), "8'd255");
}
