//! Interface integration tests
//!
//! Drives a full JSON ABI (generics, recursion, heap types, options, enums,
//! logs and configurables) through `Interface`.

use std::sync::Arc;

use lib_abi_coder::{selector, AbiError, AbiValue, CoderConfig, Interface, JsonAbi};
use lib_types::B256;
use serde_json::json;

fn abi_fixture() -> serde_json::Value {
    json!({
        "types": [
            { "typeId": 0, "type": "()" },
            { "typeId": 1, "type": "u8" },
            { "typeId": 2, "type": "u64" },
            { "typeId": 3, "type": "bool" },
            { "typeId": 4, "type": "b256" },
            { "typeId": 5, "type": "generic T" },
            { "typeId": 6, "type": "enum std::option::Option",
              "components": [ { "name": "None", "type": 0 }, { "name": "Some", "type": 5 } ],
              "typeParameters": [5] },
            { "typeId": 7, "type": "struct std::vec::Vec",
              "components": [
                  { "name": "buf", "type": 8, "typeArguments": [ { "name": "", "type": 5 } ] },
                  { "name": "len", "type": 2 }
              ],
              "typeParameters": [5] },
            { "typeId": 8, "type": "struct std::vec::RawVec",
              "components": [ { "name": "ptr", "type": 9 }, { "name": "cap", "type": 2 } ],
              "typeParameters": [5] },
            { "typeId": 9, "type": "raw untyped ptr" },
            { "typeId": 10, "type": "struct Node",
              "components": [
                  { "name": "value", "type": 2 },
                  { "name": "children", "type": 7, "typeArguments": [ { "name": "", "type": 10 } ] }
              ] },
            { "typeId": 11, "type": "struct std::string::String",
              "components": [ { "name": "bytes", "type": 12 } ] },
            { "typeId": 12, "type": "struct std::bytes::Bytes",
              "components": [ { "name": "buf", "type": 13 }, { "name": "len", "type": 2 } ] },
            { "typeId": 13, "type": "struct std::bytes::RawBytes",
              "components": [ { "name": "ptr", "type": 9 }, { "name": "cap", "type": 2 } ] },
            { "typeId": 14, "type": "enum Color",
              "components": [ { "name": "Red", "type": 0 }, { "name": "Rgb", "type": 15 } ] },
            { "typeId": 15, "type": "(_, _, _)",
              "components": [
                  { "name": "__tuple_element", "type": 1 },
                  { "name": "__tuple_element", "type": 1 },
                  { "name": "__tuple_element", "type": 1 }
              ] },
            { "typeId": 16, "type": "str[5]" },
            { "typeId": 17, "type": "[_; 2]",
              "components": [ { "name": "__array_element", "type": 2 } ] },
            { "typeId": 18, "type": "struct Pair",
              "components": [ { "name": "left", "type": 5 }, { "name": "right", "type": 5 } ],
              "typeParameters": [5] }
        ],
        "functions": [
            { "name": "sum_optional_u8",
              "inputs": [
                  { "name": "a", "type": 6, "typeArguments": [ { "name": "", "type": 1 } ] },
                  { "name": "b", "type": 6, "typeArguments": [ { "name": "", "type": 1 } ] }
              ],
              "output": { "name": "", "type": 1 } },
            { "name": "tree_size",
              "inputs": [ { "name": "root", "type": 10 } ],
              "output": { "name": "", "type": 2 } },
            { "name": "greet",
              "inputs": [ { "name": "name", "type": 11 } ],
              "output": { "name": "", "type": 16 } },
            { "name": "paint",
              "inputs": [ { "name": "color", "type": 14 } ],
              "output": { "name": "", "type": 3 },
              "attributes": [ { "name": "storage", "arguments": ["write"] } ] },
            { "name": "swap",
              "inputs": [ { "name": "pair", "type": 18, "typeArguments": [ { "name": "", "type": 2 } ] } ],
              "output": { "name": "", "type": 18, "typeArguments": [ { "name": "", "type": 2 } ] } },
            { "name": "totals",
              "inputs": [ { "name": "values", "type": 17 } ],
              "output": { "name": "", "type": 7, "typeArguments": [ { "name": "", "type": 2 } ] } }
        ],
        "loggedTypes": [
            { "logId": "0", "loggedType": { "name": "", "type": 2 } },
            { "logId": "1", "loggedType": { "name": "", "type": 14 } }
        ],
        "configurables": [
            { "name": "FEE", "configurableType": { "name": "", "type": 2 }, "offset": 8 },
            { "name": "OWNER", "configurableType": { "name": "", "type": 4 }, "offset": 16 }
        ]
    })
}

fn interface() -> Interface {
    let abi: JsonAbi = serde_json::from_value(abi_fixture()).expect("fixture parses");
    Interface::new(abi).expect("fixture resolves")
}

fn word(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

#[test]
fn test_interface_from_json_text() {
    let interface = Interface::from_json(&abi_fixture().to_string()).unwrap();
    assert_eq!(interface.functions().count(), 6);
    assert_eq!(interface.configurables().count(), 2);

    let names: Vec<_> = interface.functions().map(|f| f.name().to_string()).collect();
    assert_eq!(names[0], "sum_optional_u8");
    assert_eq!(names[5], "totals");
}

#[test]
fn test_function_signatures() {
    let interface = interface();
    let signature = |name: &str| interface.get_function(name).unwrap().signature().to_string();

    assert_eq!(signature("sum_optional_u8"), "sum_optional_u8(e<u8>((),u8),e<u8>((),u8))");
    assert_eq!(signature("greet"), "greet(s(s(s(rawptr,u64),u64)))");
    assert_eq!(signature("paint"), "paint(e((),(u8,u8,u8)))");
    assert_eq!(signature("swap"), "swap(s<u64>(u64,u64))");
    assert_eq!(signature("totals"), "totals(a[u64;2])");

    let function = interface.get_function("swap").unwrap();
    assert_eq!(function.selector(), selector("swap(s<u64>(u64,u64))"));
}

#[test]
fn test_attributes_are_kept() {
    let interface = interface();
    let paint = interface.get_function("paint").unwrap();
    assert_eq!(paint.attributes()[0].name, "storage");
    assert_eq!(paint.attributes()[0].arguments, vec!["write".to_string()]);
}

#[test]
fn test_omitted_trailing_options() {
    let interface = interface();
    let explicit = interface
        .encode_function_call("sum_optional_u8", &[AbiValue::some(AbiValue::Number(1)), AbiValue::none()])
        .unwrap();
    let omitted = interface
        .encode_function_call("sum_optional_u8", &[AbiValue::some(AbiValue::Number(1))])
        .unwrap();
    assert_eq!(explicit, omitted);
    assert_eq!(explicit.len(), 8 + 16 + 16);

    let neither = interface.encode_function_call("sum_optional_u8", &[]).unwrap();
    assert_eq!(&neither[8..], &[0u8; 32]);
}

#[test]
fn test_omitted_options_can_be_disabled() {
    let abi: JsonAbi = serde_json::from_value(abi_fixture()).unwrap();
    let config = CoderConfig {
        allow_omitted_options: false,
        ..CoderConfig::default()
    };
    let interface = Interface::with_config(abi, config).unwrap();
    let err = interface
        .encode_function_call("sum_optional_u8", &[AbiValue::none()])
        .unwrap_err();
    assert!(matches!(err, AbiError::Encode(_)));
}

#[test]
fn test_recursive_struct_through_vec() {
    let interface = interface();
    let leaf = AbiValue::structure([
        ("value", AbiValue::Number(2)),
        ("children", AbiValue::Array(vec![])),
    ]);
    let root = AbiValue::structure([
        ("value", AbiValue::Number(1)),
        ("children", AbiValue::Array(vec![leaf])),
    ]);

    let call = interface.encode_function_call("tree_size", &[root.clone()]).unwrap();
    // selector + root node + one child node
    assert_eq!(call.len(), 8 + 32 + 32);
    // children pointer counts the selector word
    assert_eq!(&call[16..24], &word(40));

    let args = interface.decode_arguments("tree_size", &call).unwrap();
    assert_eq!(args, vec![root]);
}

#[test]
fn test_string_argument_layout() {
    let interface = interface();
    let call = interface
        .encode_function_call("greet", &[AbiValue::Str("fuel".into())])
        .unwrap();

    let mut expected = selector("greet(s(s(s(rawptr,u64),u64)))").to_vec();
    expected.extend_from_slice(&word(32));
    expected.extend_from_slice(&word(4));
    expected.extend_from_slice(&word(4));
    expected.extend_from_slice(b"fuel\0\0\0\0");
    assert_eq!(call, expected);

    let args = interface.decode_arguments("greet", &call).unwrap();
    assert_eq!(args, vec![AbiValue::Str("fuel".into())]);
}

#[test]
fn test_fixed_string_result() {
    let interface = interface();
    let result = interface
        .decode_function_result("greet", b"hello\0\0\0")
        .unwrap();
    assert_eq!(result, AbiValue::Str("hello".into()));
}

#[test]
fn test_enum_argument() {
    let interface = interface();

    let red = interface
        .encode_arguments("paint", &[AbiValue::Str("Red".into())])
        .unwrap();
    assert_eq!(red, vec![0u8; 32]);

    let rgb = AbiValue::variant(
        "Rgb",
        AbiValue::Tuple(vec![AbiValue::Number(1), AbiValue::Number(2), AbiValue::Number(3)]),
    );
    let bytes = interface.encode_arguments("paint", &[rgb]).unwrap();
    assert_eq!(bytes.len(), 32);
    assert_eq!(bytes[7], 1);
    assert_eq!(bytes[15], 1);
    assert_eq!(bytes[23], 2);
    assert_eq!(bytes[31], 3);

    let err = interface
        .encode_arguments("paint", &[AbiValue::Str("Blue".into())])
        .unwrap_err();
    assert_eq!(
        err,
        AbiError::Encode("Invalid case 'Blue'. Valid cases: Red, Rgb.".into())
    );
}

#[test]
fn test_generic_struct_result() {
    let interface = interface();
    let mut returned = Vec::new();
    returned.extend_from_slice(&word(7));
    returned.extend_from_slice(&word(3));

    let result = interface.decode_function_result("swap", &returned).unwrap();
    assert_eq!(
        result,
        AbiValue::structure([("left", AbiValue::Number(7)), ("right", AbiValue::Number(3))])
    );
}

#[test]
fn test_vec_result() {
    let interface = interface();
    let mut returned = Vec::new();
    returned.extend_from_slice(&word(24));
    returned.extend_from_slice(&word(2));
    returned.extend_from_slice(&word(2));
    returned.extend_from_slice(&word(10));
    returned.extend_from_slice(&word(20));

    let result = interface.decode_function_result("totals", &returned).unwrap();
    assert_eq!(
        result,
        AbiValue::Array(vec![AbiValue::Number(10), AbiValue::Number(20)])
    );

    // pointer past the buffer
    returned.truncate(32);
    assert!(matches!(
        interface.decode_function_result("totals", &returned),
        Err(AbiError::Decode(_))
    ));
}

#[test]
fn test_decode_logs() {
    let interface = interface();
    assert_eq!(
        interface.decode_log(&word(42), "0").unwrap(),
        AbiValue::Number(42)
    );

    let red = vec![0u8; 32];
    assert_eq!(
        interface.decode_log(&red, "1").unwrap(),
        AbiValue::variant("Red", AbiValue::Unit)
    );

    let err = interface.decode_log(&word(1), "7").unwrap_err();
    assert!(matches!(err, AbiError::Decode(_)));
}

#[test]
fn test_configurable_patch_locality() {
    let interface = interface();
    let original = vec![0x11u8; 64];
    let mut bytecode = original.clone();

    interface
        .set_configurable(&mut bytecode, "FEE", &AbiValue::Number(0x0102))
        .unwrap();
    assert_eq!(&bytecode[..8], &original[..8]);
    assert_eq!(&bytecode[8..16], &word(0x0102));
    assert_eq!(&bytecode[16..], &original[16..]);

    let owner = B256::new([0xab; 32]);
    interface
        .set_configurable(&mut bytecode, "OWNER", &AbiValue::Str(owner.to_hex()))
        .unwrap();
    assert_eq!(&bytecode[16..48], owner.as_bytes());
    assert_eq!(&bytecode[48..], &original[48..]);
}

#[test]
fn test_unknown_function() {
    let interface = interface();
    let err = interface.encode_function_call("missing", &[]).unwrap_err();
    assert_eq!(err, AbiError::Encode("Function missing not found.".into()));
}

#[test]
fn test_duplicate_function_rejected() {
    let mut fixture = abi_fixture();
    let functions = fixture["functions"].as_array_mut().unwrap();
    let mut copy = functions[1].clone();
    copy["inputs"] = json!([]);
    functions.push(copy);

    let abi: JsonAbi = serde_json::from_value(fixture).unwrap();
    let err = Interface::new(abi).unwrap_err();
    assert!(matches!(err, AbiError::Schema(_)));
}

#[test]
fn test_directly_recursive_struct_rejected() {
    let abi = json!({
        "types": [
            { "typeId": 0, "type": "u64" },
            { "typeId": 1, "type": "struct Loop",
              "components": [ { "name": "value", "type": 0 }, { "name": "next", "type": 1 } ] }
        ],
        "functions": [
            { "name": "spin", "inputs": [ { "name": "l", "type": 1 } ], "output": { "name": "", "type": 0 } }
        ]
    });
    let err = Interface::from_json(&abi.to_string()).unwrap_err();
    assert!(matches!(err, AbiError::Schema(_)));
}

#[test]
fn test_shared_across_threads() {
    let interface = Arc::new(interface());
    std::thread::scope(|scope| {
        for n in 0..4u64 {
            let interface = Arc::clone(&interface);
            scope.spawn(move || {
                let pair = AbiValue::structure([
                    ("left", AbiValue::Number(n)),
                    ("right", AbiValue::Number(n + 1)),
                ]);
                let call = interface.encode_function_call("swap", &[pair.clone()]).unwrap();
                assert_eq!(interface.decode_arguments("swap", &call).unwrap(), vec![pair]);
            });
        }
    });
}
