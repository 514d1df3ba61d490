//! Read-only questions about a listfile, and the test section helper
//!
//! Target names and source paths are returned with the project variable resolved, so
//! `add_library(${PROJECT_NAME} src/a.cpp)` reports a library named after the project.

use crate::cmake::ast::{Command, CommandGroup};
use crate::cmake::document::{Document, NodeId};
use crate::cmake::ordering::Anchor;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("variable pattern is valid")
});

/// Commands inside test sections whose values after the first are test sources
const TEST_RULES: [&str; 4] = [
    "catkin_add_gtest",
    "add_rostest_gtest",
    "catkin_add_nosetests",
    "catkin_add_executable_with_gtest",
];

impl Document {
    /// The first value of the first `project()` call, or `""`
    pub fn project_name(&self) -> String {
        self.commands_named("project")
            .find_map(Command::first_token)
            .unwrap_or_default()
            .to_string()
    }

    /// Replace the project variable with the project name. Other variables stay as written,
    /// and so does the project variable in a body that has no `project()` of its own.
    pub fn resolve_variables(&self, text: &str) -> String {
        let project_name = self.project_name();
        if project_name.is_empty() {
            return text.to_string();
        }
        VARIABLE
            .replace_all(text, |caps: &regex::Captures| {
                if caps[1] == self.profile().project_variable {
                    project_name.clone()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Target name to source list for every command with this name, e.g. `add_library`
    pub fn source_build_rules(&self, command_name: &str) -> BTreeMap<String, Vec<String>> {
        let mut rules = BTreeMap::new();
        for command in self.commands_named(command_name) {
            let mut tokens = command.tokens().into_iter();
            let Some(target) = tokens.next() else {
                continue;
            };
            // option keywords such as SHARED are section names, not tokens
            let sources: Vec<String> = tokens.map(|token| self.resolve_variables(token)).collect();
            rules.insert(self.resolve_variables(target), sources);
        }
        rules
    }

    pub fn library_sources(&self) -> BTreeSet<String> {
        self.source_build_rules("add_library")
            .into_values()
            .flatten()
            .collect()
    }

    pub fn executable_sources(&self) -> BTreeSet<String> {
        self.source_build_rules("add_executable")
            .into_values()
            .flatten()
            .collect()
    }

    pub fn libraries(&self) -> Vec<String> {
        self.source_build_rules("add_library").into_keys().collect()
    }

    pub fn executables(&self) -> Vec<String> {
        self.source_build_rules("add_executable").into_keys().collect()
    }

    /// Every library and executable target with its sources
    pub fn target_build_rules(&self) -> BTreeMap<String, Vec<String>> {
        let mut rules = self.source_build_rules("add_library");
        rules.extend(self.source_build_rules("add_executable"));
        rules
    }

    /// Target name to the libraries it links, merged across `target_link_libraries` calls
    pub fn link_rules(&self) -> BTreeMap<String, Vec<String>> {
        let mut rules: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for command in self.commands_named("target_link_libraries") {
            let mut tokens = command.tokens().into_iter();
            let Some(target) = tokens.next() else {
                continue;
            };
            rules
                .entry(self.resolve_variables(target))
                .or_default()
                .extend(tokens.map(|token| self.resolve_variables(token)));
        }
        rules
    }

    /// Distinct cluster anchors in document order: targets named by build-target commands,
    /// and `include_directories` if the document has it
    pub fn ordered_build_targets(&self) -> Vec<Anchor> {
        let table = &self.profile().ordering;
        let mut anchors: Vec<Anchor> = Vec::new();
        for (_, node) in self.nodes() {
            if let Some(anchor) = table.anchor_of(node) {
                if !anchors.contains(&anchor) {
                    anchors.push(anchor);
                }
            }
        }
        anchors
    }

    /// Ids of `if` groups whose condition starts with `guard`
    pub fn conditional_section_ids(&self, guard: &str) -> Vec<NodeId> {
        self.groups()
            .iter()
            .copied()
            .filter(|id| self.group(*id).map_or(false, |group| is_guarded(group, guard)))
            .collect()
    }

    /// Bodies of `if` groups whose condition starts with `guard`
    pub fn conditional_sections(&self, guard: &str) -> Vec<&Document> {
        self.conditional_section_ids(guard)
            .into_iter()
            .filter_map(|id| self.group(id).map(|group| &group.sub))
            .collect()
    }

    /// Bodies of the test-only groups
    pub fn test_sections(&self) -> Vec<&Document> {
        self.conditional_sections(&self.profile().test_guard)
    }

    /// Sources declared inside the test-only groups: library and executable sources plus
    /// the files of test build rules
    pub fn test_sources(&self) -> BTreeSet<String> {
        let mut sources = BTreeSet::new();
        for section in self.test_sections() {
            let mut files = section.library_sources();
            files.extend(section.executable_sources());
            for command in TEST_RULES {
                files.extend(section.source_build_rules(command).into_values().flatten());
            }
            sources.extend(files.iter().map(|f| self.resolve_variables(f)));
        }
        sources
    }

    /// Body of the first test-only group. With `create_if_needed`, an empty group is inserted
    /// at its canonical position when there is none.
    pub fn test_section_mut(&mut self, create_if_needed: bool) -> Option<&mut Document> {
        let guard = self.profile().test_guard.clone();
        let id = match self.conditional_section_ids(&guard).first() {
            Some(id) => *id,
            None if create_if_needed => {
                let mut open = Command::new("if");
                open.add_section(guard, Vec::<String>::new());
                let sub = Document::nested(self.depth() + 1, self.profile().clone(), "\n");
                self.add_command(CommandGroup::new(open, sub, Command::new("endif")))
            }
            None => return None,
        };
        self.group_mut(id).map(|group| &mut group.sub)
    }
}

fn is_guarded(group: &CommandGroup, guard: &str) -> bool {
    group.open.name().eq_ignore_ascii_case("if") && group.guard() == Some(guard)
}
