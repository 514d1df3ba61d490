//! Per-tree settings shared by a document and all of its nested bodies

use crate::cmake::ordering::OrderingTable;
use crate::config::Settings;

/// Everything a document needs to know beyond its own nodes: where new commands go,
/// how synthesized lines are indented, and which names the queries look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub ordering: OrderingTable,
    /// Indentation added per nesting level to synthesized commands
    pub indent_unit: String,
    /// Keyword guarding the test-only group, as in `if(CATKIN_ENABLE_TESTING)`
    pub test_guard: String,
    /// Variable that resolves to the project's own name, without `${}`
    pub project_variable: String,
}

impl Profile {
    pub fn from_settings(settings: &Settings) -> Self {
        Profile {
            ordering: OrderingTable::catkin(),
            indent_unit: settings.formatting.indent_unit.clone(),
            test_guard: settings.queries.test_guard.clone(),
            project_variable: settings.queries.project_variable.clone(),
        }
    }

    pub fn indent(&self, depth: usize) -> String {
        self.indent_unit.repeat(depth)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            ordering: OrderingTable::catkin(),
            indent_unit: "  ".to_string(),
            test_guard: "CATKIN_ENABLE_TESTING".to_string(),
            project_variable: "PROJECT_NAME".to_string(),
        }
    }
}
