//! The document: an ordered node sequence with a name index
//!
//! Nodes live in an arena and are referred to by [NodeId]. The sequence lists the ids in
//! source order; the index maps each command name (and the group marker) to the ids carrying
//! it, also in sequence order. Every mutation goes through a method here that updates both, so
//! the index never disagrees with the sequence. [Document::is_index_consistent] checks that.
//!
//! Lookups by name see only this document's own nodes. Bodies of groups are separate
//! documents, reached through [Document::group] or the conditional-section queries.

use crate::cmake::ast::{Command, CommandGroup, Node};
use crate::cmake::ordering::{self, InsertionTrace, NoTrace, SortKey};
use crate::cmake::profile::Profile;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stable handle for a node within one document
///
/// Ids are arena indices and carry no owner. Each nested body of a group has its own arena,
/// so an id is only meaningful for the document that returned it; passed to another
/// document it may name an unrelated node there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node is filed under in the name index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Command(String),
    Group,
}

impl IndexKey {
    pub fn of(node: &Node) -> Option<IndexKey> {
        match node {
            Node::Raw(_) => None,
            Node::Command(command) => Some(IndexKey::Command(command.name().to_string())),
            Node::Group(_) => Some(IndexKey::Group),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The id does not refer to a node currently in the sequence
    UntrackedNode(NodeId),
    /// The operation needs a command or group, the id refers to raw text
    NotACommand(NodeId),
    MissingSection { command: String, section: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::UntrackedNode(id) => {
                write!(f, "node {} is not part of this document", id.0)
            }
            DocumentError::NotACommand(id) => write!(f, "node {} is not a command", id.0),
            DocumentError::MissingSection { command, section } => {
                write!(f, "command {} has no section {:?}", command, section)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

#[derive(Debug, Clone)]
pub struct Document {
    arena: Vec<Option<Node>>,
    sequence: Vec<NodeId>,
    index: HashMap<IndexKey, Vec<NodeId>>,
    depth: usize,
    profile: Arc<Profile>,
}

impl Document {
    /// An empty top-level document
    pub fn new(profile: Arc<Profile>) -> Self {
        Document::nested(0, profile, "")
    }

    /// An empty document at the given nesting depth, optionally starting with raw text
    pub fn nested(depth: usize, profile: Arc<Profile>, leading: &str) -> Self {
        let mut document = Document {
            arena: Vec::new(),
            sequence: Vec::new(),
            index: HashMap::new(),
            depth,
            profile,
        };
        if !leading.is_empty() {
            document.push(Node::Raw(leading.to_string()));
        }
        document
    }

    /// Append a node at the end of the sequence. Used while building a parsed document.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let key = IndexKey::of(&node);
        let id = self.alloc(node);
        self.sequence.push(id);
        if let Some(key) = key {
            self.index.entry(key).or_default().push(id);
        }
        id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.arena.push(Some(node));
        NodeId(self.arena.len() - 1)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    /// Number of nodes in the sequence, raw text included
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    fn node_at(&self, position: usize) -> Option<&Node> {
        self.sequence.get(position).and_then(|id| self.node(*id))
    }

    /// Position of a node in the sequence
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.sequence.iter().position(|x| *x == id)
    }

    /// Nodes in sequence order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.sequence
            .iter()
            .filter_map(move |id| self.node(*id).map(|node| (*id, node)))
    }

    pub fn command(&self, id: NodeId) -> Option<&Command> {
        self.node(id).and_then(Node::as_command)
    }

    /// Mutable access to a command. Changing its name this way is not possible; use
    /// [rename_command](Self::rename_command) so the index follows.
    pub fn command_mut(&mut self, id: NodeId) -> Option<&mut Command> {
        match self.arena.get_mut(id.0) {
            Some(Some(Node::Command(command))) => Some(command),
            _ => None,
        }
    }

    pub fn group(&self, id: NodeId) -> Option<&CommandGroup> {
        self.node(id).and_then(Node::as_group)
    }

    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut CommandGroup> {
        match self.arena.get_mut(id.0) {
            Some(Some(Node::Group(group))) => Some(group),
            _ => None,
        }
    }

    /// Ids of commands with exactly this name, in sequence order
    pub fn commands(&self, name: &str) -> &[NodeId] {
        self.index
            .get(&IndexKey::Command(name.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// Commands with exactly this name, in sequence order
    pub fn commands_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands(name)
            .iter()
            .filter_map(move |id| self.command(*id))
    }

    /// Ids of group nodes, in sequence order
    pub fn groups(&self) -> &[NodeId] {
        self.index.get(&IndexKey::Group).map_or(&[], Vec::as_slice)
    }

    /// Where [add_command](Self::add_command) would put `node`
    pub fn insertion_index(&self, node: &Node) -> usize {
        self.insertion_index_traced(node, &mut NoTrace)
    }

    pub fn insertion_index_traced(&self, node: &Node, trace: &mut dyn InsertionTrace) -> usize {
        let table = &self.profile.ordering;
        let mut anchors = self.ordered_build_targets();
        let candidate = table.sort_key(node, &mut anchors);
        let keyed: Vec<(usize, SortKey)> = self
            .sequence
            .iter()
            .enumerate()
            .filter_map(|(position, id)| {
                let node = self.node(*id)?;
                if node.is_raw() {
                    None
                } else {
                    Some((position, table.sort_key(node, &mut anchors)))
                }
            })
            .collect();
        ordering::best_position(
            &keyed,
            self.sequence.len(),
            candidate,
            table.unordered_rank(),
            trace,
        )
    }

    /// Insert a command or group at its canonical position, surrounded by the line breaks
    /// and indentation needed to keep neighbours on their own lines.
    pub fn add_command(&mut self, node: impl Into<Node>) -> NodeId {
        self.add_command_traced(node, &mut NoTrace)
    }

    pub fn add_command_traced(
        &mut self,
        node: impl Into<Node>,
        trace: &mut dyn InsertionTrace,
    ) -> NodeId {
        let node = node.into();
        let position = self.insertion_index_traced(&node, trace);
        let indent = self.profile.indent(self.depth);

        let lead = position
            .checked_sub(1)
            .map_or(Some(indent.clone()), |before| {
                lead_in(self.node_at(before), &indent)
            });
        let trail = match self.node_at(position) {
            Some(after) if !after.is_raw() => Some(format!("\n{}", indent)),
            None if self.depth > 0 => Some("\n".to_string()),
            _ => None,
        };

        let key = IndexKey::of(&node);
        let mut spliced = Vec::with_capacity(3);
        if let Some(text) = lead.filter(|t| !t.is_empty()) {
            spliced.push(self.alloc(Node::Raw(text)));
        }
        let id = self.alloc(node);
        spliced.push(id);
        if let Some(text) = trail {
            spliced.push(self.alloc(Node::Raw(text)));
        }
        self.sequence.splice(position..position, spliced);

        if let Some(key) = key {
            self.reindex(&key);
        }
        id
    }

    /// Detach a command or group from the sequence and the index. Raw text around it stays.
    pub fn remove_command(&mut self, id: NodeId) -> Result<Node, DocumentError> {
        let position = self.position(id).ok_or(DocumentError::UntrackedNode(id))?;
        let key = match self.node(id) {
            Some(node) => IndexKey::of(node).ok_or(DocumentError::NotACommand(id))?,
            None => return Err(DocumentError::UntrackedNode(id)),
        };
        self.sequence.remove(position);
        let node = self.arena[id.0]
            .take()
            .ok_or(DocumentError::UntrackedNode(id))?;
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|x| *x != id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        Ok(node)
    }

    /// Remove every command with this name, returning them in sequence order
    pub fn remove_all_commands(&mut self, name: &str) -> Result<Vec<Node>, DocumentError> {
        let ids = self.commands(name).to_vec();
        ids.into_iter().map(|id| self.remove_command(id)).collect()
    }

    /// Rename one command, moving it to its new index entry
    pub fn rename_command(&mut self, id: NodeId, name: &str) -> Result<(), DocumentError> {
        if self.position(id).is_none() {
            return Err(DocumentError::UntrackedNode(id));
        }
        let old = match self.command_mut(id) {
            Some(command) => {
                let old = command.name().to_string();
                command.set_name(name);
                old
            }
            None => return Err(DocumentError::NotACommand(id)),
        };
        self.reindex(&IndexKey::Command(old));
        self.reindex(&IndexKey::Command(name.to_string()));
        Ok(())
    }

    /// Rename every command called `old`, dropping the listed sections from each. Returns the
    /// number of commands renamed.
    pub fn rename_commands(&mut self, old: &str, new: &str, strip_sections: &[&str]) -> usize {
        let ids = self.commands(old).to_vec();
        for id in &ids {
            if let Some(command) = self.command_mut(*id) {
                command.set_name(new);
                for section in strip_sections {
                    command.remove_sections(section);
                }
            }
        }
        if !ids.is_empty() {
            self.reindex(&IndexKey::Command(old.to_string()));
            self.reindex(&IndexKey::Command(new.to_string()));
        }
        ids.len()
    }

    /// Rebuild one index entry from the sequence
    fn reindex(&mut self, key: &IndexKey) {
        let ids: Vec<NodeId> = self
            .sequence
            .iter()
            .copied()
            .filter(|id| self.node(*id).and_then(IndexKey::of).as_ref() == Some(key))
            .collect();
        if ids.is_empty() {
            self.index.remove(key);
        } else {
            self.index.insert(key.clone(), ids);
        }
    }

    /// True when the index is exactly what the sequence implies
    pub fn is_index_consistent(&self) -> bool {
        let mut expected: HashMap<IndexKey, Vec<NodeId>> = HashMap::new();
        for (id, node) in self.nodes() {
            if let Some(key) = IndexKey::of(node) {
                expected.entry(key).or_default().push(id);
            }
        }
        self.sequence.iter().all(|id| self.node(*id).is_some()) && expected == self.index
    }

    /// Find a section of a named command.
    ///
    /// Looks through every command with that name and returns the first one that has the
    /// section, with the section's position. If none has it, returns the first such command
    /// with no position. `None` when there is no command with that name.
    pub fn command_section(
        &self,
        command_name: &str,
        section_name: &str,
    ) -> Option<(NodeId, Option<usize>)> {
        let ids = self.commands(command_name);
        ids.iter()
            .find_map(|id| {
                let index = self.command(*id)?.section_index(section_name)?;
                Some((*id, Some(index)))
            })
            .or_else(|| ids.first().map(|id| (*id, None)))
    }

    /// Make sure `command_name(section_name ...)` lists every item.
    ///
    /// Missing items are appended in sorted order. A missing section is added to the first
    /// command with that name; a missing command is synthesized and inserted. Nothing happens
    /// when `items` is empty unless `allow_empty` is set, and nothing is touched when every
    /// item is already present, so the call is idempotent.
    pub fn section_check<S: AsRef<str>>(
        &mut self,
        items: &[S],
        command_name: &str,
        section_name: &str,
        allow_empty: bool,
    ) {
        if items.is_empty() && !allow_empty {
            return;
        }
        let mut wanted: Vec<String> = items.iter().map(|s| s.as_ref().to_string()).collect();
        wanted.sort();
        wanted.dedup();

        match self.command_section(command_name, section_name) {
            None => {
                let mut command = Command::new(command_name);
                command.add_section(section_name, wanted);
                self.add_command(command);
            }
            Some((id, None)) => {
                if let Some(command) = self.command_mut(id) {
                    command.add_section(section_name, wanted);
                }
            }
            Some((id, Some(index))) => {
                let Some(command) = self.command_mut(id) else {
                    return;
                };
                let missing: Vec<String> = wanted
                    .into_iter()
                    .filter(|item| !command.sections()[index].contains(item))
                    .collect();
                if missing.is_empty() {
                    return;
                }
                if let Some(section) = command.section_at_mut(index) {
                    section.values.extend(missing);
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Arc::new(Profile::default()))
    }
}

/// Text needed between the node before an insertion point and the new node
fn lead_in(before: Option<&Node>, indent: &str) -> Option<String> {
    match before {
        None => Some(indent.to_string()),
        Some(Node::Raw(text)) if text.ends_with('\n') => Some(indent.to_string()),
        Some(Node::Raw(text)) => {
            let last_line = text.rsplit('\n').next().unwrap_or_default();
            if last_line.trim().is_empty() {
                None
            } else {
                // a trailing comment without its newline
                Some(format!("\n{}", indent))
            }
        }
        Some(_) => Some(format!("\n{}", indent)),
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, node) in self.nodes() {
            node.fmt(f)?;
        }
        Ok(())
    }
}
