use fnv::FnvHashMap;

/// Pending browser tasks keyed by scheduler id. A slot owns whatever keeps
/// the task alive on the JS side, so removing it releases that too.
pub struct TaskSlots<T> {
    next_id: u64,
    slots: FnvHashMap<u64, T>,
}

impl<T> TaskSlots<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            slots: FnvHashMap::default(),
        }
    }

    /// Ids are never reused, so a stale cancel cannot hit a newer task.
    pub fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: u64, task: T) {
        self.slots.insert(id, task);
    }

    /// Take the task out. `None` once it has fired or been cancelled.
    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.slots.remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn drain(&mut self) -> Vec<T> {
        self.slots.drain().map(|(_, task)| task).collect()
    }
}

impl<T> Default for TaskSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}
