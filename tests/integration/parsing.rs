//! Integration tests for lexer + parser pipeline
//! Tests component interactions at the parsing boundary

use std::path::PathBuf;
use xpsparser::ast::XpsError;
use xpsparser::parser::Parser;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_lexer_parser_global_header() {
    let parser = Parser::new(&fixture("multiple_channels.xy")).unwrap();
    let document = parser.parse().unwrap();

    let header = &document.global_header;
    assert_eq!(header.get("Energy Axis"), Some("Kinetic Energy"));
    assert_eq!(header.get("Count Rate"), Some("Counts per Second"));
    assert_eq!(header.get("Acquisition Date"), Some("2021-03-09 15:12:01 UTC"));
    assert_eq!(header.get("Analyzer Lens"), Some("MediumArea:1.5kV"));
}

#[test]
fn test_lexer_parser_blocks() {
    let parser = Parser::new(&fixture("multiple_channels.xy")).unwrap();
    let document = parser.parse().unwrap();

    // align, Ir4f, ring current, mirror current, second Ir4f cycle
    assert_eq!(document.blocks.len(), 5);
    assert_eq!(document.blocks[0].node.rows.len(), 3);
    assert_eq!(document.blocks[1].node.header.get("Region"), Some("Ir4f"));
    assert_eq!(document.blocks[1].node.rows[0], vec![1420.0, 2000.123]);
    assert_eq!(document.blocks[3].node.rows[4], vec![1420.4, 0.013]);
    assert_eq!(document.blocks[4].node.header.get("Cycle"), Some("1, Curve: 0"));
}

#[test]
fn test_block_spans_map_to_header_lines() {
    let parser = Parser::new(&fixture("single_region.xy")).unwrap();
    let document = parser.parse().unwrap();

    let pos = parser.source_map().position(document.blocks[0].span.start);
    assert_eq!(pos.line, 14);
}

#[test]
fn test_lexer_error_propagation() {
    let input = fixture("single_region.xy").replace("1001.5  118.0", "1001.5  n/a");
    let result = Parser::new_with_filename(&input, "broken.xy");

    match result {
        Err(err @ XpsError::Syntax { .. }) => {
            let message = err.to_string();
            assert!(message.starts_with("Xps:broken.xy:21:"));
            assert!(message.contains("ERR_SYNTAX"));
        }
        _ => panic!("Expected syntax error"),
    }
}
