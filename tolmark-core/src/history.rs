//! Append-only step history with index-range views.
//!
//! All steps of a parse live in one `StepLog`. Nodes do not copy the steps
//! that built them; they keep `StepRuns`, a list of `StepRange`s into the log.
//!
//! ```text
//! log:    [0 NodeStart(div)] [1 NameStart] [2 NameEnd] [3 NodeStart(attr)] ... [9 NodeEnd]
//! div:    0..3, 9..10
//! attr:   3..9
//! ```

use crate::step::Step;
use crate::tree::NodeId;

/// A half-open range of indices into a `StepLog`.
///
/// This is 8 bytes: start (u32) + end (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    pub start: u32,
    /// Exclusive.
    pub end: u32,
}

impl StepRange {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.start <= index && index < self.end
    }
}

/// The steps attributed to one node, as coalesced ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRuns {
    runs: Vec<StepRange>,
}

impl StepRuns {
    /// Attribute the step at `index`. Indices must arrive in increasing order.
    pub fn push(&mut self, index: u32) {
        match self.runs.last_mut() {
            Some(last) if last.end == index => last.end += 1,
            _ => self.runs.push(StepRange::new(index, index + 1)),
        }
    }

    /// Number of steps attributed.
    pub fn len(&self) -> usize {
        self.runs.iter().map(StepRange::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn runs(&self) -> &[StepRange] {
        &self.runs
    }

    pub fn contains(&self, index: u32) -> bool {
        self.runs.iter().any(|run| run.contains(index))
    }

    /// Iterate over attributed indices in order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.iter().flat_map(|run| run.start..run.end)
    }
}

/// Every step of a parse, in arrival order, with the node each one was
/// attributed to.
#[derive(Debug, Default, Clone)]
pub struct StepLog {
    steps: Vec<Step>,
    targets: Vec<Option<NodeId>>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next pushed step will get.
    #[inline]
    pub fn next_index(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Append a step, returning its index.
    pub fn push(&mut self, step: Step) -> u32 {
        let index = self.next_index();
        self.steps.push(step);
        self.targets.push(None);
        index
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&Step> {
        self.steps.get(index as usize)
    }

    /// Node the step at `index` was attributed to.
    #[inline]
    pub fn target(&self, index: u32) -> Option<NodeId> {
        self.targets.get(index as usize).copied().flatten()
    }

    pub(crate) fn set_target(&mut self, index: u32, target: Option<NodeId>) {
        if let Some(slot) = self.targets.get_mut(index as usize) {
            *slot = target;
        }
    }

    /// Resolve a range to its steps. Out-of-bounds ranges resolve to `None`.
    pub fn resolve(&self, range: StepRange) -> Option<&[Step]> {
        self.steps.get(range.start as usize..range.end as usize)
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Cursor;
    use crate::step::StepKind;

    #[test]
    fn test_step_range() {
        let range = StepRange::new(3, 9);
        assert_eq!(range.len(), 6);
        assert!(range.contains(3));
        assert!(!range.contains(9));
        assert!(StepRange::new(4, 4).is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = StepRange::new(5, 3);
        assert_eq!(range.len(), 0);
        assert!(range.is_empty());
        assert!(!range.contains(4));
        assert!(StepLog::new().resolve(range).is_none());
    }

    #[test]
    fn test_runs_coalesce() {
        let mut runs = StepRuns::default();
        assert!(runs.is_empty());
        for index in [0, 1, 2, 9, 12, 13] {
            runs.push(index);
        }
        assert_eq!(
            runs.runs(),
            &[StepRange::new(0, 3), StepRange::new(9, 10), StepRange::new(12, 14)]
        );
        assert_eq!(runs.len(), 6);
        assert_eq!(runs.indices().collect::<Vec<_>>(), vec![0, 1, 2, 9, 12, 13]);
        assert!(runs.contains(9));
        assert!(!runs.contains(10));
    }

    #[test]
    fn test_log() {
        let mut log = StepLog::new();
        assert!(log.is_empty());

        let first = log.push(Step::new(StepKind::AttrsStart, Cursor::new(1, 1, 0)));
        let second = log.push(Step::new(StepKind::AttrsEnd, Cursor::new(1, 2, 1)));
        assert_eq!((first, second), (0, 1));
        assert_eq!(log.next_index(), 2);
        assert_eq!(log.get(1).map(|s| s.kind), Some(StepKind::AttrsEnd));
        assert_eq!(log.target(0), None);
        assert_eq!(log.resolve(StepRange::new(0, 2)).map(<[Step]>::len), Some(2));
        assert!(log.resolve(StepRange::new(1, 5)).is_none());
        assert_eq!(log.len(), 2);
    }
}
