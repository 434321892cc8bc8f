//! Report ingestion into the authoritative tree.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use super::resolve::{SizeResolver, DEFAULT_MIN_BLOCK_KB};
use super::tree::DuTree;
use crate::error::{IndexError, LineError, Result};
use crate::report::{parse_bytes, ReportLine, ReportLines};
use crate::storage::{Arena, IndexNode, NodeIndex};

/// Options controlling how a report is turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Path prefixes whose records are dropped, e.g. `node_modules/*`.
    pub ignore: Vec<String>,
    /// Abort on the first malformed line instead of skipping it.
    pub strict: bool,
    /// Size given to paths whose size cannot be derived.
    pub min_block_kb: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            strict: false,
            min_block_kb: DEFAULT_MIN_BLOCK_KB,
        }
    }
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Lines read from the report.
    pub lines: usize,
    /// Records attached to the tree.
    pub inserted: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
    /// Records dropped by the ignore list.
    pub ignored: usize,
    /// Nodes in the finished tree, intermediates included.
    pub nodes: usize,
}

/// Normalizes an ignore pattern to a `./`- or `/`-rooted prefix ending in `/`.
pub fn normalize_ignore(pattern: &str) -> String {
    let trimmed = pattern.strip_suffix('*').unwrap_or(pattern);

    let mut normalized = if trimmed.starts_with("./") || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("./{trimmed}")
    };

    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// `""` and `"."` inside a path refer to the directory itself.
fn is_self_segment(segment: &str) -> bool {
    segment.is_empty() || segment == "."
}

/// Incrementally attaches report records to an arena tree.
///
/// Records are expected grouped by parent directory, as `du` emits them, so
/// the last resolved parent is remembered. Any other order still works
/// through a full walk from the root.
pub struct TreeBuilder {
    nodes: Arena<IndexNode>,
    root: NodeIndex,
    root_named: bool,
    ignore: Vec<String>,
    resolver: SizeResolver,
    last_parent: Option<(String, NodeIndex)>,
    summary: BuildSummary,
}

impl TreeBuilder {
    pub fn new(options: &BuildOptions) -> Self {
        let mut nodes = Arena::with_capacity(1024);
        let root = nodes.insert(IndexNode::new("", None));
        Self {
            nodes,
            root,
            root_named: false,
            ignore: options.ignore.iter().map(|p| normalize_ignore(p)).collect(),
            resolver: SizeResolver::new(options.min_block_kb),
            last_parent: None,
            summary: BuildSummary::default(),
        }
    }

    /// Returns true when the record's path starts with an ignored prefix.
    pub fn is_ignored(&self, line: &ReportLine) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let path = line.joined_path();
        self.ignore.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Attaches one record.
    ///
    /// Returns the node the record landed on, or `None` when the ignore list
    /// dropped it. A name that already exists under the parent is updated in
    /// place. Once the root is named, a record under a different first
    /// segment (a second root of `du -a d1 d2`) is rejected.
    pub fn insert(&mut self, line: &ReportLine) -> std::result::Result<Option<NodeIndex>, LineError> {
        let Some(first) = line.segments.first() else {
            return Err(LineError::EmptyPath);
        };

        if self.is_ignored(line) {
            self.summary.ignored += 1;
            return Ok(None);
        }

        if !self.root_named {
            self.nodes[self.root].set_name(first.as_str());
            self.root_named = true;
        } else if first.as_str() != self.nodes[self.root].name() {
            return Err(LineError::ForeignRoot {
                path: line.joined_path(),
                root: self.nodes[self.root].name().to_string(),
            });
        }

        let target = if line.segments.len() == 1 {
            self.root
        } else {
            let parent = self.parent_for(line);
            let name = line.name();
            if is_self_segment(name) {
                parent
            } else {
                self.child_or_create(parent, name)
            }
        };

        self.nodes[target].apply_report(line.size_kb, line.modified);
        self.summary.inserted += 1;
        Ok(Some(target))
    }

    /// Resolves the record's parent directory, reusing the previous one when
    /// the parent path repeats.
    fn parent_for(&mut self, line: &ReportLine) -> NodeIndex {
        let parent_segments = line.parent_segments();
        let key = parent_segments.join("/");

        if let Some((last_key, last_id)) = &self.last_parent {
            if *last_key == key {
                return *last_id;
            }
        }

        let id = self.walk_or_create(parent_segments);
        self.last_parent = Some((key, id));
        id
    }

    /// Walks from the root, creating missing directories.
    ///
    /// The first segment is the root itself.
    fn walk_or_create(&mut self, segments: &[String]) -> NodeIndex {
        let mut current = self.root;
        for segment in segments.iter().skip(1) {
            if is_self_segment(segment) {
                continue;
            }
            current = self.child_or_create(current, segment);
        }
        current
    }

    fn child_or_create(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        if let Some(existing) = self.nodes[parent].child(name) {
            return existing;
        }
        let id = self.nodes.insert(IndexNode::new(name, Some(parent)));
        self.nodes[parent].attach_child(name, id);
        id
    }

    /// Resolves all sizes and freezes the tree.
    pub fn finish(self) -> (DuTree, BuildSummary) {
        let mut summary = self.summary;
        summary.nodes = self.nodes.len();
        let tree = DuTree::new(self.nodes, self.root, self.resolver);
        (tree, summary)
    }
}

/// Builds a tree from a report stream.
///
/// Malformed lines are logged and skipped unless `options.strict` is set.
/// Blank lines are ignored. I/O errors always abort.
pub fn build_tree<R: BufRead>(reader: R, options: &BuildOptions) -> Result<(DuTree, BuildSummary)> {
    let started = Instant::now();
    let mut builder = TreeBuilder::new(options);

    for item in ReportLines::new(reader) {
        let (line_no, raw) = item?;
        builder.summary.lines += 1;
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let outcome = parse_bytes(&raw).and_then(|line| builder.insert(&line));
        if let Err(source) = outcome {
            if options.strict {
                return Err(IndexError::Line { line_no, source });
            }
            builder.summary.skipped += 1;
            log::warn!("skipping report line {}: {}", line_no, source);
        }
    }

    let (tree, summary) = builder.finish();
    log::info!(
        "built disk-usage index: {} nodes from {} lines ({} skipped, {} ignored) in {:?}",
        summary.nodes,
        summary.lines,
        summary.skipped,
        summary.ignored,
        started.elapsed()
    );
    Ok((tree, summary))
}

/// Opens a report file and builds a tree from it.
pub fn build_tree_from_path(path: &Path, options: &BuildOptions) -> Result<(DuTree, BuildSummary)> {
    let file = File::open(path)?;
    build_tree(BufReader::new(file), options)
}
