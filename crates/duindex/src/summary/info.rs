//! Query options and result nodes.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Bounds applied to a single query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoOptions {
    /// Levels of children to include below the queried node.
    pub deep: usize,
    /// Real children kept per node; 0 keeps all of them.
    pub max_items: usize,
    /// Cumulative size fraction after which the remaining children are
    /// folded into `Others`, in `(0, 1]`.
    pub long_tail_percent: f64,
}

impl Default for InfoOptions {
    /// The default query: the node's own summary, no children.
    fn default() -> Self {
        Self {
            deep: 0,
            max_items: 1,
            long_tail_percent: 1.0,
        }
    }
}

impl InfoOptions {
    pub fn new(deep: usize, max_items: usize, long_tail_percent: f64) -> Self {
        Self {
            deep,
            max_items,
            long_tail_percent,
        }
    }

    /// Returns true for the cache-eligible default query.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        let percent = self.long_tail_percent;
        if !(percent > 0.0 && percent <= 1.0) {
            return Err(IndexError::InvalidArgument(format!(
                "long tail percent must be in 0 < x <= 1, got {percent}"
            )));
        }
        Ok(())
    }
}

/// One node of a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoNode {
    pub name: String,
    /// Full report path, e.g. `./pytest/Dockerfile.base`.
    pub path: String,
    pub size_kb: u64,
    pub modified_timestamp: i64,
    /// Share of the parent's size in ten-thousandths (8210 = 82.10%).
    pub percent_of_parent: u32,
    /// True for the aggregated `Others` bucket.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
    #[serde(default)]
    pub children: Vec<InfoNode>,
}

impl InfoNode {
    /// Looks up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&InfoNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follows a chain of child names.
    pub fn descendant(&self, names: &[&str]) -> Option<&InfoNode> {
        names
            .iter()
            .try_fold(self, |node, name| node.child(name))
    }
}
