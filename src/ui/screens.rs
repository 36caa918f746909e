use std::collections::VecDeque;

/// Upper bound on remembered process log lines.
const PROCESS_LOG_CAPACITY: usize = 200;

/// Selection state for the book list. The list itself lives in the store;
/// this only tracks which row is highlighted.
#[derive(Default)]
pub(crate) struct BookListState {
    pub(crate) selected: usize,
}

impl BookListState {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn select(&mut self, index: usize, len: usize) {
        self.selected = index;
        self.ensure_in_bounds(len);
    }

    /// Clamp after the list shrank.
    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Newest-last record of stored entries for this session.
pub(crate) struct ProcessLog {
    lines: VecDeque<String>,
}

impl Default for ProcessLog {
    fn default() -> Self {
        Self {
            lines: VecDeque::with_capacity(PROCESS_LOG_CAPACITY),
        }
    }
}

impl ProcessLog {
    pub(crate) fn push(&mut self, line: String) {
        if self.lines.len() == PROCESS_LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// The last `count` lines, oldest first.
    pub(crate) fn tail(&self, count: usize) -> impl Iterator<Item = &String> {
        self.lines.iter().skip(self.lines.len().saturating_sub(count))
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }
}
