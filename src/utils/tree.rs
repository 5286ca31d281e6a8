use std::collections::HashMap;

use crate::models::comment::{CommentTree, CommentWithPath};

/// Folds flat traversal rows into one tree per distinct root.
///
/// Rows may come from several trees interleaved in any order. Trees are
/// returned in the order their root id first appears in `rows`, and siblings
/// keep their relative input order.
pub fn assemble_forest(rows: Vec<CommentWithPath>) -> Vec<CommentTree> {
    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<CommentWithPath>> = HashMap::new();

    for row in rows {
        let root_id = row.root_id();
        groups
            .entry(root_id)
            .or_insert_with(|| {
                order.push(root_id);
                Vec::new()
            })
            .push(row);
    }

    let mut forest = Vec::with_capacity(order.len());
    for root_id in order {
        if let Some(group) = groups.remove(&root_id) {
            forest.extend(assemble_tree(root_id, group));
        }
    }
    forest
}

/// Builds the tree of a single root group.
///
/// The root is the row whose id is `root_id`. When the batch is partial and that
/// row is missing, the first row whose parent is not in the batch takes its
/// place, and failing that the first row. Other rows with unresolved parents are
/// returned as trees of their own after the root tree.
fn assemble_tree(root_id: i64, rows: Vec<CommentWithPath>) -> Vec<CommentTree> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut index: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        index.entry(row.id()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut unresolved: Vec<usize> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if index.get(&row.id()) != Some(&i) {
            // duplicate id, first occurrence wins
            continue;
        }
        let parent = row
            .comment
            .parent_id
            .and_then(|parent_id| index.get(&parent_id).copied())
            .filter(|&parent| parent != i && row.id() != root_id);

        match parent {
            Some(parent) => children[parent].push(i),
            None => unresolved.push(i),
        }
    }

    let root = match unresolved.iter().position(|&i| rows[i].id() == root_id) {
        Some(pos) => unresolved.remove(pos),
        None if !unresolved.is_empty() => {
            let fallback = unresolved.remove(0);
            tracing::warn!(
                root_id,
                fallback_id = rows[fallback].id(),
                "root row missing from batch, using first row with unresolved parent"
            );
            fallback
        }
        None => {
            tracing::warn!(
                root_id,
                fallback_id = rows[0].id(),
                "no row without a parent in batch, using first row as root"
            );
            0
        }
    };

    let mut slots: Vec<Option<CommentWithPath>> = rows.into_iter().map(Some).collect();
    let mut trees = Vec::with_capacity(1 + unresolved.len());

    for start in std::iter::once(root).chain(unresolved) {
        if let Some(tree) = materialize(start, &mut slots, &children) {
            trees.push(tree);
        }
    }

    let skipped = slots.iter().filter(|slot| slot.is_some()).count();
    if skipped > 0 {
        tracing::warn!(root_id, skipped, "rows not reachable from any root were skipped");
    }

    trees
}

struct Frame {
    idx: usize,
    node: CommentTree,
    next_child: usize,
}

/// Moves the subtree starting at `start` out of `slots`.
///
/// Iterative so that deep reply chains cannot exhaust the stack; a slot is
/// taken at most once, so malformed cyclic input terminates.
fn materialize(
    start: usize,
    slots: &mut [Option<CommentWithPath>],
    children: &[Vec<usize>],
) -> Option<CommentTree> {
    let row = slots[start].take()?;
    let mut stack = vec![Frame {
        idx: start,
        node: CommentTree::from(row),
        next_child: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(&child) = children[frame.idx].get(frame.next_child) {
            frame.next_child += 1;
            if let Some(row) = slots[child].take() {
                stack.push(Frame {
                    idx: child,
                    node: CommentTree::from(row),
                    next_child: 0,
                });
            }
            continue;
        }

        let done = stack.pop()?;
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(done.node),
            None => return Some(done.node),
        }
    }

    None
}
