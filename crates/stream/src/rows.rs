use glam::Vec3;

/// Container for the content built on one grid row.
///
/// Item positions are expected to be row-local, so recycling a row is a
/// single translation of `offset`.
#[derive(Debug, Clone)]
pub struct RowContainer<T> {
    index: usize,
    offset: Vec3,
    items: Vec<T>,
    recycle_count: u32,
}

impl<T> RowContainer<T> {
    pub fn new(index: usize, offset: Vec3) -> Self {
        Self {
            index,
            offset,
            items: Vec::new(),
            recycle_count: 0,
        }
    }

    /// Grid row this container was created for.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current world position of the row.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How many times this row has been moved to the far end.
    pub fn recycle_count(&self) -> u32 {
        self.recycle_count
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub(crate) fn recycle(&mut self, delta: Vec3) {
        self.offset += delta;
        self.recycle_count += 1;
    }
}
