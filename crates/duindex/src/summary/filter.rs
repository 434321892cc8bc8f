//! Sort, truncate and aggregate children of a snapshot.

use super::info::InfoOptions;
use super::snapshot::Snapshot;
use crate::error::Result;
use crate::storage::NodeIndex;

/// Name of the synthetic bucket holding truncated children.
pub const OTHERS_NAME: &str = "Others";

/// `percent_of_parent` of a node that is its whole parent.
pub const PERCENT_SCALE: u32 = 10_000;

/// Share of `whole` taken by `part`, in ten-thousandths, rounded down.
///
/// A zero `whole` yields 0.
pub fn percent_of(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = u128::from(part) * u128::from(PERCENT_SCALE) / u128::from(whole);
    scaled.min(u128::from(PERCENT_SCALE)) as u32
}

/// Reduces every node below `start` to its largest children plus an
/// `Others` bucket for the remainder.
///
/// Options are validated before anything is touched. Real children that
/// survive are processed with the same bounds; `Others` is a leaf.
pub fn filter_long_tail(snapshot: &mut Snapshot, start: NodeIndex, options: &InfoOptions) -> Result<()> {
    options.validate()?;

    let mut pending = vec![start];
    while let Some(id) = pending.pop() {
        let kept = filter_node(snapshot, id, options);
        pending.extend(kept);
    }
    Ok(())
}

/// Filters one node's children and returns the real children kept.
fn filter_node(snapshot: &mut Snapshot, id: NodeIndex, options: &InfoOptions) -> Vec<NodeIndex> {
    let parent_kb = snapshot.resolve_size(id);
    if snapshot.children(id).is_empty() {
        return Vec::new();
    }
    snapshot.sort_children(id);

    let sorted = snapshot.children(id).to_vec();
    let mut kept = Vec::with_capacity(sorted.len());
    let mut cum: u64 = 0;
    let mut truncated = false;

    for child in sorted {
        let child_kb = snapshot.resolve_size(child);

        if options.max_items != 0 && kept.len() >= options.max_items {
            truncated = true;
            break;
        }
        if !kept.is_empty() && exceeds_cutoff(cum.saturating_add(child_kb), parent_kb, options.long_tail_percent) {
            truncated = true;
            break;
        }

        snapshot.node_mut(child).percent_of_parent = percent_of(child_kb, parent_kb);
        cum = cum.saturating_add(child_kb);
        kept.push(child);
    }

    let mut children = kept.clone();
    if truncated && !kept.is_empty() {
        let rest = parent_kb.saturating_sub(cum);
        let others = snapshot.push_synthetic(id, OTHERS_NAME, rest, percent_of(rest, parent_kb));
        children.push(others);
    }
    snapshot.replace_children(id, children);

    kept
}

/// True when `cum_kb / parent_kb` would go above `limit`.
fn exceeds_cutoff(cum_kb: u64, parent_kb: u64, limit: f64) -> bool {
    parent_kb != 0 && cum_kb as f64 > limit * parent_kb as f64
}
