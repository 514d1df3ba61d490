//! Output formats for parsed listfiles
//!
//! Every format turns a [Document](crate::cmake::document::Document) into a string and is
//! looked up by name through the [FormatRegistry]:
//!
//!   - `text`: the listfile itself, byte-identical to the input until something is edited
//!   - `treeviz`: one line per node, nesting shown with box-drawing connectors
//!   - `json` / `yaml`: the node tree with sections and source state
//!
//! Token streams are not document formats; [tokens_to_json] covers them.

pub mod registry;
pub mod treeviz;
pub mod views;

pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
pub use views::{tokens_to_json, JsonFormatter, TextFormatter, YamlFormatter};
