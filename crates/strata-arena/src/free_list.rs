//! Per-size-class LIFO free lists.
//!
//! Each class keeps only the offset of its most recently freed block; the
//! rest of the stack is threaded through the `next_free`/`prev_free` links
//! of the block records themselves.

use crate::block::{BlockState, BlockTable};

/// Tops of the free-list stacks, one per size class.
pub(crate) struct FreeLists {
    tops: Vec<Option<u32>>,
}

impl FreeLists {
    pub(crate) fn new(class_count: usize) -> Self {
        Self {
            tops: vec![None; class_count],
        }
    }

    /// Most recently freed block of `class`, if any.
    pub(crate) fn top(&self, class: usize) -> Option<u32> {
        self.tops.get(class).copied().flatten()
    }

    /// Park the block at `offset` on top of its class's stack and mark it free.
    pub(crate) fn push(&mut self, blocks: &mut BlockTable, offset: u32) {
        let class = blocks[offset].class();
        let below = self.tops[class];
        {
            let block = &mut blocks[offset];
            block.state = BlockState::Free;
            block.prev_free = below;
            block.next_free = None;
        }
        if let Some(below) = below {
            blocks[below].next_free = Some(offset);
        }
        self.tops[class] = Some(offset);
    }

    /// Unlink the block at `offset` from its class's stack and mark it live.
    ///
    /// The block may sit anywhere in the stack, not only on top.
    pub(crate) fn remove(&mut self, blocks: &mut BlockTable, offset: u32) {
        let (class, above, below) = {
            let block = &mut blocks[offset];
            let links = (block.class(), block.next_free, block.prev_free);
            block.state = BlockState::Live;
            block.next_free = None;
            block.prev_free = None;
            links
        };
        if self.tops[class] == Some(offset) {
            self.tops[class] = below;
        }
        if let Some(above) = above {
            blocks[above].prev_free = below;
        }
        if let Some(below) = below {
            blocks[below].next_free = above;
        }
    }

    /// Walk the stack of `class` from top to bottom.
    pub(crate) fn iter<'a>(
        &self,
        blocks: &'a BlockTable,
        class: usize,
    ) -> impl Iterator<Item = u32> + 'a {
        std::iter::successors(self.top(class), move |&offset| {
            blocks.get(offset).and_then(|b| b.prev_free)
        })
    }

    pub(crate) fn clear(&mut self) {
        self.tops.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{size_class, total_size, Block};

    const CAPACITY: usize = 4096;
    const CLASSES: usize = 64;

    fn table_with(sizes: &[usize]) -> (BlockTable, Vec<u32>) {
        let mut table = BlockTable::new(CAPACITY);
        let mut offsets = Vec::new();
        let mut cursor = 0u32;
        for &size in sizes {
            let total = total_size(size).unwrap() as u32;
            table.insert(cursor, Block::carved(total, offsets.last().copied()));
            offsets.push(cursor);
            cursor += total;
        }
        (table, offsets)
    }

    fn class_of(size: usize) -> usize {
        size_class(total_size(size).unwrap())
    }

    #[test]
    fn push_links_in_lifo_order() {
        let (mut table, offs) = table_with(&[32, 32, 32]);
        let mut lists = FreeLists::new(CLASSES);
        for &o in &offs {
            lists.push(&mut table, o);
        }

        assert_eq!(table[offs[0]].next_free, Some(offs[1]));
        assert_eq!(table[offs[1]].prev_free, Some(offs[0]));
        assert_eq!(table[offs[1]].next_free, Some(offs[2]));
        assert_eq!(table[offs[2]].prev_free, Some(offs[1]));
        assert_eq!(lists.top(class_of(32)), Some(offs[2]));
        assert!(offs.iter().all(|&o| table[o].is_free()));
    }

    #[test]
    fn remove_from_middle_and_top() {
        let (mut table, offs) = table_with(&[32, 32, 32]);
        let mut lists = FreeLists::new(CLASSES);
        for &o in &offs {
            lists.push(&mut table, o);
        }
        let class = class_of(32);

        lists.remove(&mut table, offs[1]);
        assert_eq!(table[offs[1]].state, BlockState::Live);
        assert_eq!(table[offs[0]].next_free, Some(offs[2]));
        assert_eq!(table[offs[2]].prev_free, Some(offs[0]));
        assert_eq!(lists.top(class), Some(offs[2]));

        lists.remove(&mut table, offs[2]);
        assert_eq!(lists.top(class), Some(offs[0]));
        assert_eq!(table[offs[0]].next_free, None);

        lists.remove(&mut table, offs[0]);
        assert_eq!(lists.top(class), None);
        assert!(offs.iter().all(|&o| table[o].state == BlockState::Live));
    }

    #[test]
    fn pops_return_most_recent_first() {
        let (mut table, offs) = table_with(&[32, 32, 32]);
        let mut lists = FreeLists::new(CLASSES);
        for &o in &offs {
            lists.push(&mut table, o);
        }
        let class = class_of(32);

        let mut popped = Vec::new();
        while let Some(top) = lists.top(class) {
            lists.remove(&mut table, top);
            popped.push(top);
        }
        assert_eq!(popped, vec![offs[2], offs[1], offs[0]]);
    }

    #[test]
    fn classes_are_segregated() {
        let (mut table, offs) = table_with(&[16, 64, 16]);
        let mut lists = FreeLists::new(CLASSES);
        for &o in &offs {
            lists.push(&mut table, o);
        }

        let small: Vec<u32> = lists.iter(&table, class_of(16)).collect();
        let large: Vec<u32> = lists.iter(&table, class_of(64)).collect();
        assert_eq!(small, vec![offs[2], offs[0]]);
        assert_eq!(large, vec![offs[1]]);
    }

    #[test]
    fn clear_empties_every_class() {
        let (mut table, offs) = table_with(&[16, 64]);
        let mut lists = FreeLists::new(CLASSES);
        for &o in &offs {
            lists.push(&mut table, o);
        }
        lists.clear();
        assert_eq!(lists.top(class_of(16)), None);
        assert_eq!(lists.top(class_of(64)), None);
    }
}
