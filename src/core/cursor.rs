/// Owned snapshot captured once, walked one item per pull.
///
/// The position never moves backwards, so once the cursor reports
/// exhaustion it stays exhausted.
#[derive(Debug, Clone)]
pub struct SnapshotCursor<T> {
    items: Vec<T>,
    position: usize,
}

impl<T> SnapshotCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.get(self.position)
    }

    pub fn step(&mut self) {
        if self.position < self.items.len() {
            self.position += 1;
        }
    }

    pub fn next_item(&mut self) -> Option<&T> {
        let index = self.position;
        self.step();
        self.items.get(index)
    }

    /// Drops whatever is left, e.g. after the backend became unusable.
    pub fn exhaust(&mut self) {
        self.position = self.items.len();
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.items.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.position
    }
}
