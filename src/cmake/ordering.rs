//! Canonical command ordering and insertion placement
//!
//! The ordering table ranks command names into slots. Commands in the same slot are equally
//! ranked; names not in the table rank one past the last slot ("unordered", fits anywhere).
//! One slot holds the build-target commands (`add_library`, `target_link_libraries`, ...).
//! Those are clustered by the target they name, so everything about target `foo` stays
//! together even when the targets themselves were declared far apart.
//!
//! Sort Keys
//!
//!     A node's key is `(rank, cluster)`. The cluster is only set for build-target commands:
//!     `(anchor, kind)` where anchor is the position of the command's first value among the
//!     distinct targets seen so far in document order, and kind is the command's position in
//!     the build-target list. `include_directories` shares the build-target slot and gets its
//!     own anchor once the document contains one.
//!
//! Placement
//!
//!     Existing nodes are never moved. [best_position] scans the keyed nodes, scores the slot in
//!     front of each node that does not sort before the candidate by how far the candidate is
//!     from its would-be neighbours, and compares the best such slot with the slot after the last
//!     node. A slot only counts when the candidate sorts at or after the node before it and at
//!     or before the node after it. This gives a sensible position even in files that were
//!     never sorted.

use crate::cmake::ast::Node;
use serde::Serialize;

/// Commands that declare or configure a build target, in intra-cluster order
pub const BUILD_TARGET_COMMANDS: [&str; 5] = [
    "add_library",
    "add_executable",
    "add_rostest",
    "add_dependencies",
    "target_link_libraries",
];

/// One rank of the ordering table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Commands of equal rank
    Commands(Vec<String>),
    /// Build-target commands, clustered per target, plus commands that share their rank
    BuildTargets {
        commands: Vec<String>,
        shared: Vec<String>,
    },
    /// Every command group (`if` … `endif` and the like)
    Groups,
}

impl Slot {
    fn single(name: &str) -> Self {
        Slot::Commands(vec![name.to_string()])
    }

    fn many(names: &[&str]) -> Self {
        Slot::Commands(names.iter().map(|n| n.to_string()).collect())
    }

    fn contains(&self, name: &str) -> bool {
        match self {
            Slot::Commands(names) => names.iter().any(|n| n == name),
            Slot::BuildTargets { commands, shared } => {
                commands.iter().chain(shared.iter()).any(|n| n == name)
            }
            Slot::Groups => false,
        }
    }
}

/// A ranked list of slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingTable {
    slots: Vec<Slot>,
}

impl OrderingTable {
    pub fn new(slots: Vec<Slot>) -> Self {
        OrderingTable { slots }
    }

    /// The catkin package layout
    pub fn catkin() -> Self {
        OrderingTable::new(vec![
            Slot::single("cmake_minimum_required"),
            Slot::single("project"),
            Slot::single("set_directory_properties"),
            Slot::single("find_package"),
            Slot::single("pkg_check_modules"),
            Slot::single("set"),
            Slot::single("catkin_generate_virtualenv"),
            Slot::single("catkin_python_setup"),
            Slot::single("add_definitions"),
            Slot::single("add_message_files"),
            Slot::single("add_service_files"),
            Slot::single("add_action_files"),
            Slot::single("generate_dynamic_reconfigure_options"),
            Slot::single("generate_messages"),
            Slot::single("catkin_package"),
            Slot::single("catkin_metapackage"),
            Slot::BuildTargets {
                commands: BUILD_TARGET_COMMANDS.iter().map(|n| n.to_string()).collect(),
                shared: vec!["include_directories".to_string()],
            },
            Slot::many(&["roslint_cpp", "roslint_python", "roslint_add_test"]),
            Slot::single("catkin_add_gtest"),
            Slot::Groups,
            Slot::many(&["install", "catkin_install_python"]),
        ])
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Rank given to names the table does not know
    pub fn unordered_rank(&self) -> usize {
        self.slots.len()
    }

    /// Rank of a command name; command names are case-insensitive
    pub fn rank(&self, command_name: &str) -> usize {
        let name = command_name.to_ascii_lowercase();
        self.slots
            .iter()
            .position(|slot| slot.contains(&name))
            .unwrap_or_else(|| self.unordered_rank())
    }

    pub fn group_rank(&self) -> usize {
        self.slots
            .iter()
            .position(|slot| *slot == Slot::Groups)
            .unwrap_or_else(|| self.unordered_rank())
    }

    /// Position of a command within the build-target list, if it is one
    pub fn target_kind(&self, command_name: &str) -> Option<usize> {
        let name = command_name.to_ascii_lowercase();
        self.slots.iter().find_map(|slot| match slot {
            Slot::BuildTargets { commands, .. } => commands.iter().position(|c| *c == name),
            _ => None,
        })
    }

    /// Commands that share the build-target rank without naming a target
    pub fn is_shared_target_rank(&self, command_name: &str) -> bool {
        let name = command_name.to_ascii_lowercase();
        self.slots.iter().any(|slot| match slot {
            Slot::BuildTargets { shared, .. } => shared.iter().any(|s| *s == name),
            _ => false,
        })
    }

    /// Anchor a command contributes to the cluster list, if any
    pub fn anchor_of(&self, node: &Node) -> Option<Anchor> {
        let command = node.as_command()?;
        if self.is_shared_target_rank(command.name()) {
            return Some(Anchor::Shared(command.name().to_ascii_lowercase()));
        }
        self.target_kind(command.name())?;
        command
            .first_token()
            .map(|target| Anchor::Target(target.to_string()))
    }

    /// Sort key of a node. A build-target command whose target was not seen yet appends
    /// it to `anchors`, so a new target starts a new cluster after the existing ones.
    pub fn sort_key(&self, node: &Node, anchors: &mut Vec<Anchor>) -> SortKey {
        match node {
            Node::Raw(_) => SortKey {
                rank: self.unordered_rank(),
                cluster: None,
            },
            Node::Group(_) => SortKey {
                rank: self.group_rank(),
                cluster: None,
            },
            Node::Command(command) => {
                let rank = self.rank(command.name());
                let cluster = match (self.target_kind(command.name()), command.first_token()) {
                    (Some(kind), Some(target)) => {
                        let anchor = Anchor::Target(target.to_string());
                        Some((anchor_index(anchors, anchor), kind))
                    }
                    (Some(_), None) => None,
                    (None, _) if self.is_shared_target_rank(command.name()) => {
                        let anchor = Anchor::Shared(command.name().to_ascii_lowercase());
                        anchors
                            .iter()
                            .position(|a| *a == anchor)
                            .map(|index| (index, 0))
                    }
                    (None, _) => None,
                };
                SortKey { rank, cluster }
            }
        }
    }
}

impl Default for OrderingTable {
    fn default() -> Self {
        OrderingTable::catkin()
    }
}

fn anchor_index(anchors: &mut Vec<Anchor>, anchor: Anchor) -> usize {
    match anchors.iter().position(|a| *a == anchor) {
        Some(index) => index,
        None => {
            anchors.push(anchor);
            anchors.len() - 1
        }
    }
}

/// A cluster identity in the build-target slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum Anchor {
    /// A declared target name
    Target(String),
    /// A command sharing the build-target rank, e.g. `include_directories`
    Shared(String),
}

/// `(rank, cluster)`; compares lexicographically, `None` clusters sort first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SortKey {
    pub rank: usize,
    pub cluster: Option<(usize, usize)>,
}

impl SortKey {
    /// Key assumed before the first node
    pub const ORIGIN: SortKey = SortKey {
        rank: 0,
        cluster: None,
    };

    /// Signed gap from `other` to `self`; the cluster component only counts when both keys
    /// belong to a cluster
    pub fn distance(&self, other: &SortKey) -> Distance {
        let cluster = match (self.cluster, other.cluster) {
            (Some((a, _)), Some((b, _))) => a as isize - b as isize,
            _ => 0,
        };
        Distance {
            rank: self.rank as isize - other.rank as isize,
            cluster,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Distance {
    pub rank: isize,
    pub cluster: isize,
}

impl Distance {
    /// Neither component goes backwards
    pub fn is_forward(&self) -> bool {
        self.rank >= 0 && self.cluster >= 0
    }
}

/// Score of an insertion slot; lower is better, fields compare in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Score {
    pub gap: isize,
    pub cluster_gap: isize,
    /// 0 when the slot touches a node with the candidate's exact key
    pub tie: u8,
}

/// One step of the placement scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceEvent {
    Candidate {
        key: SortKey,
    },
    /// The node sorts before the candidate
    Skip {
        position: usize,
        key: SortKey,
    },
    Scored {
        slot: usize,
        key: SortKey,
        score: Score,
        accepted: bool,
    },
    /// The node has no rank and is not scored
    Unordered {
        position: usize,
        key: SortKey,
    },
    Tail {
        slot: usize,
        score: Score,
        accepted: bool,
    },
    Chosen {
        position: usize,
    },
}

/// Receives the placement scan, step by step
pub trait InsertionTrace {
    fn event(&mut self, event: &TraceEvent);
}

/// Discards all events
pub struct NoTrace;

impl InsertionTrace for NoTrace {
    fn event(&mut self, _event: &TraceEvent) {}
}

impl InsertionTrace for Vec<TraceEvent> {
    fn event(&mut self, event: &TraceEvent) {
        self.push(event.clone());
    }
}

/// Pick the sequence position for a new node.
///
/// `nodes` are the `(position, key)` pairs of every non-raw node in sequence order and `len`
/// is the full sequence length. The returned position is either directly after an existing
/// node, directly before the first one, or `len` when nothing fits.
pub fn best_position(
    nodes: &[(usize, SortKey)],
    len: usize,
    candidate: SortKey,
    unordered_rank: usize,
    trace: &mut dyn InsertionTrace,
) -> usize {
    trace.event(&TraceEvent::Candidate { key: candidate });

    let mut prev: Option<(usize, SortKey)> = None;
    let mut best: Option<(Score, usize)> = None;

    for &(position, key) in nodes {
        if key < candidate {
            trace.event(&TraceEvent::Skip { position, key });
        } else if key.rank != unordered_rank {
            let prev_key = prev.map_or(SortKey::ORIGIN, |(_, k)| k);
            let before = candidate.distance(&prev_key);
            let after = key.distance(&candidate);
            let score = Score {
                gap: before.rank + after.rank,
                cluster_gap: before.cluster + after.cluster,
                tie: if key == candidate { 0 } else { 1 },
            };
            let slot = prev.map_or(position, |(p, _)| p + 1);
            let accepted =
                before.is_forward() && after.is_forward() && best.map_or(true, |(b, _)| score < b);
            trace.event(&TraceEvent::Scored {
                slot,
                key,
                score,
                accepted,
            });
            if accepted {
                best = Some((score, slot));
            }
        } else {
            trace.event(&TraceEvent::Unordered { position, key });
        }
        prev = Some((position, key));
    }

    let chosen = match prev {
        None => len,
        Some((last, last_key)) => {
            let tail = candidate.distance(&last_key);
            let score = Score {
                gap: tail.rank,
                cluster_gap: tail.cluster,
                tie: if last_key == candidate { 0 } else { 1 },
            };
            let accepted = tail.is_forward() && best.map_or(true, |(b, _)| score <= b);
            trace.event(&TraceEvent::Tail {
                slot: last + 1,
                score,
                accepted,
            });
            if accepted {
                last + 1
            } else {
                best.map_or(len, |(_, slot)| slot)
            }
        }
    };

    trace.event(&TraceEvent::Chosen { position: chosen });
    chosen
}
