//! # cmakelists
//!
//! Format-preserving parsing and editing of CMake listfiles.
//!
//! A parsed [Document](cmake::Document) renders back to the exact input. Edits touch only the
//! commands they change: untouched commands keep their original text, and new commands are
//! placed at their canonical position in the catkin layout without moving anything else.
//!
//! The [config] module loads the settings that shape that behavior.

pub mod cmake;
pub mod config;
