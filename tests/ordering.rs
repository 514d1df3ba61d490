//! Placement of new commands in existing listfiles

use cmakelists::cmake::ordering::{OrderingTable, TraceEvent};
use cmakelists::cmake::{parse, serialize, Command, Document, NodeId};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("Failed to read fixture")
}

fn cmd(snippet: &str) -> Command {
    snippet.parse().expect("snippet should parse")
}

fn insert(source: &str, snippet: &str) -> String {
    let mut doc = parse(source).unwrap();
    doc.add_command(cmd(snippet));
    assert!(doc.is_index_consistent());
    serialize(&doc)
}

#[test]
fn test_table_puts_minimum_version_before_project() {
    let table = OrderingTable::catkin();
    assert!(table.rank("cmake_minimum_required") < table.rank("project"));
}

#[test]
fn test_minimum_version_goes_first() {
    assert_eq!(
        insert("project(foo)\n", "cmake_minimum_required(VERSION 3.5)"),
        "cmake_minimum_required(VERSION 3.5)\nproject(foo)\n"
    );
}

#[test]
fn test_unknown_command_in_empty_document_appends() {
    let mut doc = Document::default();
    doc.add_command(cmd("totally_unknown(x)"));
    assert_eq!(serialize(&doc), "totally_unknown(x)");
}

#[test]
fn test_unknown_command_goes_after_last_command() {
    assert_eq!(
        insert("project(a)\ninstall(FILES x)\n", "message(hi)"),
        "project(a)\ninstall(FILES x)\nmessage(hi)\n"
    );
}

#[test]
fn test_dependency_joins_its_target_cluster() {
    let source = "add_library(a src/a.cpp)\nadd_library(b src/b.cpp)\n";
    assert_eq!(
        insert(source, "target_link_libraries(a x)"),
        "add_library(a src/a.cpp)\ntarget_link_libraries(a x)\nadd_library(b src/b.cpp)\n"
    );
    assert_eq!(
        insert(source, "target_link_libraries(b y)"),
        "add_library(a src/a.cpp)\nadd_library(b src/b.cpp)\ntarget_link_libraries(b y)\n"
    );
}

#[test]
fn test_new_target_starts_cluster_after_existing() {
    let source = "project(p)\nadd_library(a src/a.cpp)\ninstall(TARGETS a)\n";
    assert_eq!(
        insert(source, "add_executable(c src/c.cpp)"),
        "project(p)\nadd_library(a src/a.cpp)\nadd_executable(c src/c.cpp)\ninstall(TARGETS a)\n"
    );
}

#[test]
fn test_lands_next_to_same_command_in_unsorted_file() {
    let source = read_fixture("unsorted.cmake");
    let output = insert(&source, "find_package(roscpp REQUIRED)");
    assert!(output.contains("find_package(catkin REQUIRED)\nfind_package(roscpp REQUIRED)\ncatkin_package()"));
}

#[test]
fn test_group_goes_before_install() {
    let mut doc = parse("project(foo)\nadd_library(foo a.cpp)\n\ninstall(TARGETS foo)\n").unwrap();
    doc.test_section_mut(true).unwrap();
    assert_eq!(
        serialize(&doc),
        "project(foo)\nadd_library(foo a.cpp)\nif(CATKIN_ENABLE_TESTING)\nendif()\n\ninstall(TARGETS foo)\n"
    );
}

#[test]
fn test_trace_ends_with_chosen_position() {
    let mut doc = parse("project(foo)\ncatkin_package()\n").unwrap();
    let candidate = cmd("find_package(catkin REQUIRED)");
    let expected = doc.insertion_index(&candidate.clone().into());
    let mut events: Vec<TraceEvent> = Vec::new();
    let id = doc.add_command_traced(candidate, &mut events);
    assert!(matches!(events.first(), Some(TraceEvent::Candidate { .. })));
    assert_eq!(events.last(), Some(&TraceEvent::Chosen { position: expected }));
    assert!(doc.position(id).is_some());
    assert_eq!(
        serialize(&doc),
        "project(foo)\nfind_package(catkin REQUIRED)\ncatkin_package()\n"
    );
}

#[test]
fn test_trace_events_serialize_as_json_lines() {
    let doc = parse("project(foo)\n").unwrap();
    let mut events: Vec<TraceEvent> = Vec::new();
    doc.insertion_index_traced(&cmd("install(FILES a)").into(), &mut events);
    let lines: Vec<String> = events
        .iter()
        .map(|event| serde_json::to_string(event).unwrap())
        .collect();
    assert!(lines[0].starts_with(r#"{"event":"candidate""#));
    assert!(lines.last().unwrap().contains(r#""event":"chosen""#));
}

const INSERTABLE: [&str; 12] = [
    "cmake_minimum_required(VERSION 3.0)",
    "project(other)",
    "find_package(tf REQUIRED)",
    "set(FLAGS -O2)",
    "add_message_files(FILES A.msg)",
    "catkin_package(CATKIN_DEPENDS roscpp)",
    "add_library(gamma src/gamma.cpp)",
    "target_link_libraries(alpha m)",
    "include_directories(include)",
    "catkin_add_gtest(t test/t.cpp)",
    "install(FILES data.yaml DESTINATION share)",
    "custom_thing(1 2 3)",
];

fn original_texts(doc: &Document, ids: &[NodeId]) -> Vec<String> {
    doc.nodes()
        .filter(|(id, _)| ids.contains(id))
        .map(|(_, node)| node.to_string())
        .collect()
}

proptest! {
    #[test]
    fn test_insertion_never_reorders_existing_nodes(
        picks in prop::collection::vec(0..INSERTABLE.len(), 1..8)
    ) {
        let source = read_fixture("unsorted.cmake");
        let mut doc = parse(&source).unwrap();
        let ids: Vec<NodeId> = doc.nodes().filter(|(_, n)| !n.is_raw()).map(|(id, _)| id).collect();
        let before = original_texts(&doc, &ids);

        for pick in picks {
            doc.add_command(cmd(INSERTABLE[pick]));
            prop_assert!(doc.is_index_consistent());
        }

        prop_assert_eq!(original_texts(&doc, &ids), before);
        // the result still parses, and parses to the same text
        let output = serialize(&doc);
        prop_assert_eq!(serialize(&parse(&output).unwrap()), output);
    }
}
