//! Generation-checked handle table for sessions owned across the C boundary.
//!
//! A handle packs a slot index (high 32 bits) and the slot's generation
//! (low 32 bits). Removing a value bumps the generation, so stale handles
//! miss instead of aliasing a newer session.

enum Entry<T> {
    Occupied(T),
    Vacant,
}

struct Slot<T> {
    generation: u32,
    entry: Entry<T>,
}

pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    fn split(handle: u64) -> (usize, u32) {
        ((handle >> 32) as usize, handle as u32)
    }

    fn join(index: u32, generation: u32) -> u64 {
        (u64::from(index) << 32) | u64::from(generation)
    }

    pub fn insert(&mut self, value: T) -> u64 {
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Entry::Occupied(value);
                Self::join(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Entry::Occupied(value),
                });
                Self::join(index, 0)
            }
        }
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = Self::split(handle);
        match self.slots.get(index)? {
            Slot {
                generation: g,
                entry: Entry::Occupied(value),
            } if *g == generation => Some(value),
            _ => None,
        }
    }

    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = Self::split(handle);
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let Entry::Occupied(value) = std::mem::replace(&mut slot.entry, Entry::Vacant) else {
            return None;
        };
        slot.generation = slot.generation.wrapping_add(1);
        // A wrapped generation would match handles from the slot's first use.
        if slot.generation != 0 {
            self.vacant.push(index as u32);
        }
        Some(value)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.entry, Entry::Occupied(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut table = HandleTable::new();
        let h = table.insert("a");
        assert_eq!(table.get(h), Some(&"a"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(1);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.get(h), None);
        assert_eq!(table.remove(h), None);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut table = HandleTable::new();
        let first = table.insert(1);
        table.remove(first);
        let second = table.insert(2);
        assert_ne!(first, second);
        assert_eq!(first >> 32, second >> 32);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }

    #[test]
    fn unknown_handle_misses() {
        let table: HandleTable<u8> = HandleTable::new();
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(u64::MAX), None);
    }

    #[test]
    fn exhausted_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(1);
        table.slots[0].generation = u32::MAX;
        let h_max = (h & !0xFFFF_FFFF) | u64::from(u32::MAX);
        assert_eq!(table.remove(h_max), Some(1));
        let next = table.insert(2);
        assert_eq!(next >> 32, 1);
    }
}
