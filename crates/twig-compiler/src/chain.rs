//! Conditional chain tracking across sibling elements.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use vue_markup::NodeId;

/// How the closing tag of an open `v-if` group is remembered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainMode {
    /// One cursor per parent, dropped as soon as a sibling element breaks
    /// the chain.
    #[default]
    Scoped,
    /// A single cursor shared by the whole walk and never cleared.
    Compat,
}

impl std::str::FromStr for ChainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scoped" => Ok(ChainMode::Scoped),
            "compat" => Ok(ChainMode::Compat),
            other => Err(format!("unknown chain mode `{other}`")),
        }
    }
}

/// Points at the `endif` text node that a following `v-else-if` or `v-else`
/// turns into a continuation.
#[derive(Debug, Default)]
pub struct ChainCursor {
    mode: ChainMode,
    scoped: FxHashMap<NodeId, NodeId>,
    global: Option<NodeId>,
}

impl ChainCursor {
    pub fn new(mode: ChainMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// The open group's closing node for children of `parent`.
    pub fn get(&self, parent: NodeId) -> Option<NodeId> {
        match self.mode {
            ChainMode::Scoped => self.scoped.get(&parent).copied(),
            ChainMode::Compat => self.global,
        }
    }

    pub fn set(&mut self, parent: NodeId, close: NodeId) {
        match self.mode {
            ChainMode::Scoped => {
                self.scoped.insert(parent, close);
            }
            ChainMode::Compat => self.global = Some(close),
        }
    }

    /// Ends the chain under `parent`. Compat mode keeps the stale cursor.
    pub fn reset(&mut self, parent: NodeId) {
        if self.mode == ChainMode::Scoped {
            self.scoped.remove(&parent);
        }
    }
}
