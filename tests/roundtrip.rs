//! Round-trip identity: parsing and serializing without edits reproduces the input exactly

use cmakelists::cmake::lexing::{detokenize, tokenize};
use cmakelists::cmake::{parse, serialize};
use proptest::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("Failed to read fixture")
}

#[rstest]
#[case("catkin_package.cmake")]
#[case("unsorted.cmake")]
#[case("nested_groups.cmake")]
#[case("crlf_tabs.cmake")]
fn test_fixture_round_trips(#[case] name: &str) {
    let source = read_fixture(name);
    let doc = parse(&source).unwrap();
    assert_eq!(serialize(&doc), source);
    assert!(doc.is_index_consistent());
}

#[rstest]
#[case("catkin_package.cmake")]
#[case("nested_groups.cmake")]
#[case("crlf_tabs.cmake")]
fn test_fixture_detokenizes(#[case] name: &str) {
    let source = read_fixture(name);
    let tokens = tokenize(&source).unwrap();
    assert_eq!(detokenize(&source, &tokens), source);
}

#[rstest]
#[case("")]
#[case("\n\n")]
#[case("# only a comment")]
#[case("project(foo)")]
#[case("project  (foo)  # trailing\n")]
#[case("set(X \"a;b\" 'c' [=[d]=])\n")]
#[case("if(A)\nelse()\nendif()")]
#[case("add_definitions(-DCOLOR=#FFF)\nproject(p)\n")]
fn test_small_inputs_round_trip(#[case] source: &str) {
    assert_eq!(serialize(&parse(source).unwrap()), source);
}

#[test]
fn test_untouched_commands_survive_edits_elsewhere() {
    let source = read_fixture("catkin_package.cmake");
    let mut doc = parse(&source).unwrap();
    doc.section_check(&["geometry_msgs"], "find_package", "COMPONENTS", false);
    let output = serialize(&doc);

    // everything after the edited command is unchanged
    let tail = source.split_once("find_package(Boost").unwrap().1;
    assert!(output.ends_with(tail));
    assert!(output.contains("  tf\n  geometry_msgs\n)"));
}

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_./]{0,8}",
        "[A-Z][A-Z_]{0,8}",
        "\\$\\{[A-Za-z_]{1,8}\\}",
        "\"[a-z ;]{0,8}\"",
    ]
}

fn separator() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(" ".to_string()),
        Just("  ".to_string()),
        Just("\n  ".to_string()),
        Just("\t".to_string()),
        Just(" # note\n    ".to_string()),
    ]
}

fn command() -> impl Strategy<Value = String> {
    (
        "[a-z_]{1,12}",
        prop_oneof![Just(""), Just(" ")],
        prop::collection::vec((separator(), word()), 0..6),
        prop_oneof![Just(""), Just("\n"), Just(" ")],
    )
        .prop_map(|(name, blank, args, closing)| {
            let mut text = format!("{}{}(", name, blank);
            for (i, (sep, word)) in args.iter().enumerate() {
                if i > 0 {
                    text.push_str(sep);
                }
                text.push_str(word);
            }
            text.push_str(closing);
            text.push(')');
            text
        })
        // group keywords need a partner; keep generated documents flat
        .prop_filter("no group commands", |text| {
            let name = text.split('(').next().unwrap_or_default().trim();
            !matches!(
                name,
                "if" | "endif" | "foreach" | "endforeach" | "while" | "endwhile" | "function"
                    | "endfunction" | "macro" | "endmacro" | "block" | "endblock"
            )
        })
}

fn gap() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("\n".to_string()),
        Just("\n\n".to_string()),
        Just("  # comment\n".to_string()),
        Just("\r\n".to_string()),
        Just("\n\t".to_string()),
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec((command(), gap()), 0..10).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(command, gap)| format!("{}{}", command, gap))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_generated_documents_round_trip(source in document()) {
        let doc = parse(&source).unwrap();
        prop_assert_eq!(serialize(&doc), source);
        prop_assert!(doc.is_index_consistent());
    }

    #[test]
    fn test_tokenize_never_panics(source in "\\PC{0,64}") {
        // errors are fine, panics are not
        let _ = tokenize(&source);
        let _ = parse(&source);
    }
}
