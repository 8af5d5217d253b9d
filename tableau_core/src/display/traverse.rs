// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::DisplayList;

/// An iterator over the direct children of a node, in draw order
/// (back to front).
///
/// Created by [`DisplayList::children`].
#[derive(Debug)]
pub struct Children<'a> {
    list: &'a DisplayList,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(list: &'a DisplayList, first: u32) -> Self {
        Self {
            list,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.list.next_sibling[idx as usize];
        Some(self.list.id_at(idx))
    }
}
