// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed Object Pool.
//!
//! A pre-sized arena of tagged slots with a free-index stack. After
//! construction no operation allocates: `pop` fills a free slot, `push`
//! empties it and makes it the next one handed out. Handles carry a
//! generation so a handle to a recycled slot is rejected instead of
//! aliasing the new occupant.

use crate::engine_core::errors::PoolError;

/// Index of a live slot plus the generation it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// Storage position of the slot.
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

#[derive(Debug)]
pub struct FixedPool<T> {
    slots: Box<[Slot<T>]>,
    free: Vec<u32>,
}

impl<T> FixedPool<T> {
    /// Build a pool holding at most `capacity` objects.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots = (0..capacity)
            .map(|_| Slot {
                value: None,
                generation: 0,
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let mut free = Vec::with_capacity(capacity);
        // Reversed so the lowest index is handed out first.
        free.extend((0..capacity as u32).rev());
        Self { slots, free }
    }

    /// Place `value` in a free slot.
    pub fn pop(&mut self, value: T) -> Result<PoolHandle, PoolError> {
        self.pop_with(|_| value)
    }

    /// Place the value built by `make` in a free slot. `make` receives the
    /// handle the value will live under.
    pub fn pop_with<F>(&mut self, make: F) -> Result<PoolHandle, PoolError>
    where
        F: FnOnce(PoolHandle) -> T,
    {
        let index = self.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.slots.len(),
        })?;
        let slot = &mut self.slots[index as usize];
        let handle = PoolHandle {
            index,
            generation: slot.generation,
        };
        slot.value = Some(make(handle));
        Ok(handle)
    }

    /// Return a slot to the free list, handing back its value. Stale or
    /// foreign handles are ignored.
    pub fn push(&mut self, handle: PoolHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(value)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Drop every live object and reset the free list to full capacity.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len() as u32).rev());
    }

    /// Live objects in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    PoolHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}
