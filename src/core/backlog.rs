//! Scrollback (backlog) ring
//!
//! Rows evicted from the top of the primary screen are stored in an arena of
//! `capacity` slots. A write head walks the arena; when every slot is in use
//! the oldest row's slot is reused. Positions come from a monotonically
//! increasing counter (`backpos`) and are never handed out twice, so they
//! stay valid coordinates after the physical slot has been recycled.
//!
//! Resident rows are the last `len` rows stored, oldest first, with strictly
//! increasing positions. `pop_newest` rewinds the head, so a popped row's
//! slot is free again and counts against nothing. Its position stays
//! retired.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::grid::Row;
use crate::error::{Result, TermptyError};

/// One historical row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogRow {
    /// Cells with trailing blanks trimmed
    pub cells: Vec<Cell>,
    /// Width of the grid the row was evicted from
    pub width: usize,
    /// The row soft-wrapped into the next one
    pub wrapped: bool,
    /// Position assigned when the row was pushed
    pub position: u64,
}

impl BacklogRow {
    fn from_row(mut row: Row, position: u64) -> Self {
        let width = row.cells.len();
        row.cells.truncate(row.content_len());
        row.cells.shrink_to_fit();
        Self {
            cells: row.cells,
            width,
            wrapped: row.wrapped,
            position,
        }
    }

    /// Rebuild a grid row `cols` wide, padding or truncating as needed
    pub fn into_row(self, cols: usize) -> Result<Row> {
        let mut row = Row {
            cells: self.cells,
            wrapped: self.wrapped,
        };
        row.resize(cols)?;
        Ok(row)
    }

    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_wide_continuation())
            .map(|c| if c.is_empty() { " " } else { c.content.as_str() })
            .collect::<String>()
            .trim_end_matches(' ')
            .to_string()
    }
}

/// A resumable reference into the backlog.
///
/// The beacon names the first position its holder has not seen yet. It goes
/// stale when the backlog is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BacklogBeacon {
    pub position: u64,
    pub generation: u64,
}

/// Outcome of a backlog lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogLookup<'a> {
    Resident(&'a BacklogRow),
    /// The row existed but is gone (evicted, popped or cleared)
    Evicted,
    /// The position has not been assigned yet
    NotYetWritten,
}

impl<'a> BacklogLookup<'a> {
    pub fn row(self) -> Option<&'a BacklogRow> {
        match self {
            BacklogLookup::Resident(row) => Some(row),
            _ => None,
        }
    }
}

/// Rows a beacon holder has not seen, plus whether some were lost
#[derive(Debug, Clone)]
pub struct Resume<'a> {
    pub rows: BacklogIter<'a>,
    /// Rows at or after the beacon were evicted or cleared before being read
    pub lost: bool,
}

/// Bounded ring of historical rows
#[derive(Debug, Clone)]
pub struct Backlog {
    slots: Vec<Option<BacklogRow>>,
    /// Slot the next push writes to
    head: usize,
    len: usize,
    backpos: u64,
    /// Every position below this was evicted or cleared
    floor: u64,
    generation: u64,
}

impl Backlog {
    /// Create a backlog holding at most `capacity` rows
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            slots: alloc_slots(capacity)?,
            head: 0,
            len: 0,
            backpos: 0,
            floor: 0,
            generation: 0,
        })
    }

    /// Maximum number of resident rows
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of resident rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The next position that will be assigned
    pub fn backpos(&self) -> u64 {
        self.backpos
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A beacon marking everything pushed so far as seen
    pub fn beacon(&self) -> BacklogBeacon {
        BacklogBeacon {
            position: self.backpos,
            generation: self.generation,
        }
    }

    /// Positions below this were lost to eviction or clearing. Popped rows
    /// do not move it.
    pub fn window_start(&self) -> u64 {
        self.floor
    }

    /// Append a row. With every slot in use the oldest row's slot is
    /// reused; with a capacity of zero the row is dropped but its position
    /// is consumed.
    pub fn push(&mut self, row: Row) -> u64 {
        let position = self.backpos;
        self.backpos += 1;
        let capacity = self.capacity();
        if capacity == 0 {
            self.floor = self.backpos;
            return position;
        }

        let slot = &mut self.slots[self.head];
        if self.len == capacity {
            if let Some(oldest) = slot.as_ref() {
                self.floor = oldest.position + 1;
            }
        } else {
            self.len += 1;
        }
        *slot = Some(BacklogRow::from_row(row, position));
        self.head = (self.head + 1) % capacity;
        position
    }

    /// Remove and return the newest resident row, freeing its slot
    pub fn pop_newest(&mut self) -> Option<BacklogRow> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        self.head = (self.head + capacity - 1) % capacity;
        self.len -= 1;
        self.slots[self.head].take()
    }

    /// Look up a row by position
    pub fn get(&self, position: u64) -> BacklogLookup<'_> {
        if position >= self.backpos {
            return BacklogLookup::NotYetWritten;
        }
        self.at(self.lower_bound(position))
            .filter(|row| row.position == position)
            .map_or(BacklogLookup::Evicted, BacklogLookup::Resident)
    }

    /// Look up the row a beacon points at
    pub fn get_beacon(&self, beacon: BacklogBeacon) -> BacklogLookup<'_> {
        if beacon.generation != self.generation {
            return BacklogLookup::Evicted;
        }
        self.get(beacon.position)
    }

    /// Resident rows, oldest first
    pub fn iter(&self) -> BacklogIter<'_> {
        BacklogIter {
            backlog: self,
            front: 0,
            back: self.len,
        }
    }

    /// Resident rows whose positions fall in `range`, oldest first
    pub fn range(&self, range: Range<u64>) -> BacklogIter<'_> {
        let front = self.lower_bound(range.start);
        let back = self.lower_bound(range.end).max(front);
        BacklogIter {
            backlog: self,
            front,
            back,
        }
    }

    /// Rows written since `beacon` was taken
    pub fn resume(&self, beacon: BacklogBeacon) -> Resume<'_> {
        if beacon.generation != self.generation {
            return Resume {
                rows: self.iter(),
                lost: true,
            };
        }
        Resume {
            rows: self.range(beacon.position..self.backpos),
            lost: beacon.position < self.floor,
        }
    }

    /// Change the capacity. Shrinking evicts the oldest rows first; growing
    /// does not bring evicted rows back.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity == self.capacity() {
            return Ok(());
        }
        let mut slots = alloc_slots(capacity)?;
        let keep = self.len.min(capacity);
        let evicted = self.len - keep;
        for index in 0..self.len {
            let slot = self.slot_of(index);
            let Some(row) = self.slots[slot].take() else {
                continue;
            };
            if index < evicted {
                self.floor = row.position + 1;
            } else {
                slots[index - evicted] = Some(row);
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, capacity, "backlog shrunk");
        }
        self.slots = slots;
        self.len = keep;
        self.head = if capacity == 0 { 0 } else { keep % capacity };
        Ok(())
    }

    /// Drop every row; outstanding beacons become stale
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.len = 0;
        self.head = 0;
        self.floor = self.backpos;
        self.generation += 1;
    }

    /// Physical slot of the `index`-th resident row, oldest first
    fn slot_of(&self, index: usize) -> usize {
        let capacity = self.capacity();
        (self.head + capacity - self.len + index) % capacity
    }

    fn at(&self, index: usize) -> Option<&BacklogRow> {
        if index >= self.len {
            return None;
        }
        self.slots[self.slot_of(index)].as_ref()
    }

    /// Index of the first resident row at or after `position`
    fn lower_bound(&self, position: u64) -> usize {
        let (mut lo, mut hi) = (0, self.len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.at(mid) {
                Some(row) if row.position < position => lo = mid + 1,
                _ => hi = mid,
            }
        }
        lo
    }
}

fn alloc_slots(capacity: usize) -> Result<Vec<Option<BacklogRow>>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|e| TermptyError::alloc("backlog", e))?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

/// Lazy iterator over resident rows. Cloning it restarts from the same point.
#[derive(Debug, Clone)]
pub struct BacklogIter<'a> {
    backlog: &'a Backlog,
    front: usize,
    back: usize,
}

impl<'a> Iterator for BacklogIter<'a> {
    type Item = &'a BacklogRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let row = self.backlog.at(self.front);
        self.front += 1;
        row
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back.saturating_sub(self.front);
        (n, Some(n))
    }
}

impl DoubleEndedIterator for BacklogIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back <= self.front {
            return None;
        }
        self.back -= 1;
        self.backlog.at(self.back)
    }
}

impl ExactSizeIterator for BacklogIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(text: &str, cols: usize) -> Row {
        let mut row = Row::new(cols);
        for (i, c) in text.chars().enumerate() {
            row.cells[i] = Cell::new(c);
        }
        row
    }

    fn texts(iter: BacklogIter<'_>) -> Vec<String> {
        iter.map(BacklogRow::text).collect()
    }

    #[test]
    fn test_push_and_get() {
        let mut backlog = Backlog::new(10).unwrap();
        assert!(backlog.is_empty());
        assert_eq!(backlog.push(row("one", 80)), 0);
        assert_eq!(backlog.push(row("two", 80)), 1);

        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog.backpos(), 2);
        let first = backlog.get(0).row().unwrap();
        assert_eq!(first.text(), "one");
        assert_eq!(first.width, 80);
        assert_eq!(first.cells.len(), 3);
        assert_eq!(backlog.get(2), BacklogLookup::NotYetWritten);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut backlog = Backlog::new(3).unwrap();
        for i in 0..5 {
            backlog.push(row(&i.to_string(), 4));
        }
        assert_eq!(backlog.len(), 3);
        assert_eq!(backlog.backpos(), 5);
        assert_eq!(backlog.get(1), BacklogLookup::Evicted);
        assert_eq!(texts(backlog.iter()), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut backlog = Backlog::new(0).unwrap();
        backlog.push(row("gone", 4));
        assert_eq!(backlog.backpos(), 1);
        assert!(backlog.is_empty());
        assert_eq!(backlog.get(0), BacklogLookup::Evicted);
        assert_eq!(backlog.iter().count(), 0);
        assert!(backlog.pop_newest().is_none());
    }

    #[test]
    fn test_shrink_evicts_oldest() {
        let mut backlog = Backlog::new(5).unwrap();
        for i in 0..5 {
            backlog.push(row(&i.to_string(), 4));
        }
        backlog.set_capacity(2).unwrap();
        assert_eq!(backlog.len(), 2);
        assert_eq!(texts(backlog.iter()), vec!["3", "4"]);

        backlog.set_capacity(10).unwrap();
        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog.get(0), BacklogLookup::Evicted);
        assert_eq!(backlog.get(4).row().unwrap().text(), "4");

        backlog.push(row("5", 4));
        assert_eq!(texts(backlog.iter()), vec!["3", "4", "5"]);
    }

    #[test]
    fn test_pop_newest_frees_slot() {
        let mut backlog = Backlog::new(3).unwrap();
        for i in 0..3 {
            backlog.push(row(&i.to_string(), 4));
        }
        assert_eq!(backlog.pop_newest().unwrap().text(), "2");
        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog.get(2), BacklogLookup::Evicted);

        // Position 2 is never reused, but its slot is
        assert_eq!(backlog.push(row("3", 4)), 3);
        assert_eq!(texts(backlog.iter()), vec!["0", "1", "3"]);
        assert_eq!(backlog.len(), 3);
        assert_eq!(backlog.window_start(), 0);

        backlog.push(row("4", 4));
        assert_eq!(texts(backlog.iter()), vec!["1", "3", "4"]);
        assert_eq!(backlog.get(0), BacklogLookup::Evicted);
        assert_eq!(backlog.get(3).row().unwrap().text(), "3");
        assert_eq!(backlog.window_start(), 1);
    }

    #[test]
    fn test_pop_then_push_refills_to_capacity() {
        let mut backlog = Backlog::new(2).unwrap();
        backlog.push(row("a", 4));
        backlog.push(row("b", 4));
        for _ in 0..5 {
            let popped = backlog.pop_newest().unwrap();
            assert_eq!(backlog.len(), 1);
            backlog.push(popped.into_row(4).unwrap());
            assert_eq!(backlog.len(), 2);
        }
        assert_eq!(texts(backlog.iter()), vec!["a", "b"]);
        assert_eq!(backlog.backpos(), 7);
    }

    #[test]
    fn test_resume_after_pop_is_not_lost() {
        let mut backlog = Backlog::new(4).unwrap();
        backlog.push(row("a", 4));
        let beacon = backlog.beacon();
        backlog.push(row("b", 4));
        backlog.pop_newest();

        let resume = backlog.resume(beacon);
        assert!(!resume.lost);
        assert_eq!(resume.rows.len(), 0);

        backlog.push(row("c", 4));
        let resume = backlog.resume(beacon);
        assert!(!resume.lost);
        assert_eq!(texts(resume.rows), vec!["c"]);
    }

    #[test]
    fn test_clear_invalidates_beacons() {
        let mut backlog = Backlog::new(4).unwrap();
        backlog.push(row("a", 4));
        let beacon = BacklogBeacon {
            position: 0,
            generation: backlog.generation(),
        };
        assert!(backlog.get_beacon(beacon).row().is_some());

        backlog.clear();
        assert!(backlog.is_empty());
        assert_eq!(backlog.backpos(), 1);
        assert_eq!(backlog.get_beacon(beacon), BacklogLookup::Evicted);
        assert!(backlog.resume(beacon).lost);
    }

    #[test]
    fn test_resume_reports_loss() {
        let mut backlog = Backlog::new(2).unwrap();
        backlog.push(row("a", 4));
        let beacon = backlog.beacon();

        backlog.push(row("b", 4));
        let resume = backlog.resume(beacon);
        assert!(!resume.lost);
        assert_eq!(texts(resume.rows), vec!["b"]);

        backlog.push(row("c", 4));
        backlog.push(row("d", 4));
        let resume = backlog.resume(beacon);
        assert!(resume.lost);
        assert_eq!(texts(resume.rows), vec!["c", "d"]);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let mut backlog = Backlog::new(4).unwrap();
        for s in ["a", "b", "c"] {
            backlog.push(row(s, 4));
        }
        let mut iter = backlog.iter();
        iter.next();
        let saved = iter.clone();
        assert_eq!(texts(iter), vec!["b", "c"]);
        assert_eq!(texts(saved), vec!["b", "c"]);
        assert_eq!(texts(backlog.range(1..2)), vec!["b"]);
        assert_eq!(
            backlog.iter().rev().map(BacklogRow::text).collect::<Vec<_>>(),
            vec!["c", "b", "a"]
        );
    }

    #[test]
    fn test_into_row_pads_to_width() {
        let mut backlog = Backlog::new(2).unwrap();
        backlog.push(row("abc", 10));
        let restored = backlog.pop_newest().unwrap().into_row(6).unwrap();
        assert_eq!(restored.len(), 6);
        assert_eq!(restored.text(), "abc");
    }
}
