//! Queries over realistic package listfiles

use cmakelists::cmake::ordering::Anchor;
use cmakelists::cmake::{parse, parse_with, Profile};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("Failed to read fixture")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_catkin_package_targets() {
    let doc = parse(&read_fixture("catkin_package.cmake")).unwrap();
    assert_eq!(doc.project_name(), "robot_driver");
    assert_eq!(doc.libraries(), strings(&["robot_driver"]));
    assert_eq!(doc.executables(), strings(&["driver_node"]));
    assert_eq!(
        doc.library_sources(),
        BTreeSet::from(["src/driver.cpp".to_string(), "src/serial_port.cpp".to_string()])
    );
    assert_eq!(
        doc.executable_sources(),
        BTreeSet::from(["src/driver_node.cpp".to_string()])
    );
}

#[test]
fn test_catkin_package_target_rules() {
    let doc = parse(&read_fixture("catkin_package.cmake")).unwrap();
    let rules = doc.target_build_rules();
    assert_eq!(
        rules.get("robot_driver"),
        Some(&strings(&["src/driver.cpp", "src/serial_port.cpp"]))
    );
    assert_eq!(
        rules.get("driver_node"),
        Some(&strings(&["src/driver_node.cpp"]))
    );
    assert_eq!(rules.len(), 2);
}

#[test]
fn test_catkin_package_links() {
    let doc = parse(&read_fixture("catkin_package.cmake")).unwrap();
    let links = doc.link_rules();
    assert_eq!(
        links.get("robot_driver"),
        Some(&strings(&["${catkin_LIBRARIES}", "${Boost_LIBRARIES}"]))
    );
    assert_eq!(
        links.get("driver_node"),
        Some(&strings(&["robot_driver", "${catkin_LIBRARIES}"]))
    );
}

#[test]
fn test_catkin_package_anchors() {
    let doc = parse(&read_fixture("catkin_package.cmake")).unwrap();
    assert_eq!(
        doc.ordered_build_targets(),
        vec![
            Anchor::Shared("include_directories".to_string()),
            Anchor::Target("${PROJECT_NAME}".to_string()),
            Anchor::Target("driver_node".to_string()),
        ]
    );
}

#[test]
fn test_catkin_package_test_section() {
    let doc = parse(&read_fixture("catkin_package.cmake")).unwrap();
    let sections = doc.test_sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].depth(), 1);
    assert_eq!(sections[0].commands("find_package").len(), 1);
    // the nested if(TARGET ...) is part of the body, not another test section
    assert_eq!(sections[0].groups().len(), 1);
    assert_eq!(
        doc.test_sources(),
        BTreeSet::from(["test/test_driver.cpp".to_string()])
    );
}

#[test]
fn test_conditional_sections_by_guard() {
    let doc = parse(&read_fixture("nested_groups.cmake")).unwrap();
    assert_eq!(doc.groups().len(), 5);
    let windows = doc.conditional_sections("WIN32");
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].commands("elseif").len(), 1);
    assert!(doc.test_sections().is_empty());
}

#[test]
fn test_custom_guard_from_profile() {
    let profile = Profile {
        test_guard: "BUILD_TESTING".to_string(),
        ..Profile::default()
    };
    let source = "project(x)\nif(BUILD_TESTING)\n  add_executable(t_x test/x.cpp)\nendif()\n";
    let doc = parse_with(source, Arc::new(profile)).unwrap();
    assert_eq!(doc.test_sections().len(), 1);
    assert_eq!(doc.test_sources(), BTreeSet::from(["test/x.cpp".to_string()]));
}

#[test]
fn test_project_variable_in_nested_body_resolves_against_root() {
    let source = "project(nav)\nif(CATKIN_ENABLE_TESTING)\n  catkin_add_gtest(t test/${PROJECT_NAME}_test.cpp)\nendif()\n";
    let doc = parse(source).unwrap();
    assert_eq!(
        doc.test_sources(),
        BTreeSet::from(["test/nav_test.cpp".to_string()])
    );
}
