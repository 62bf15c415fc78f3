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

//! Reference-Counted Shared Vector.
//!
//! Cloning a [`SharedVector`] aliases the same backing sequence and bumps a
//! plain (non-atomic) reference count; the backing store is freed with the
//! last handle. Several tainted strings can therefore point at one list of
//! ranges without copying it.
//!
//! Element ownership: the vector owns its elements by value and drops them
//! with the backing store. When the elements are pool handles, as for
//! ranges, dropping a handle releases nothing; the pool that issued it stays
//! the sole owner of the pooled object.
//!
//! The handle is deliberately `!Send`:
//!
//! ```compile_fail
//! fn assert_send<T: Send>() {}
//! assert_send::<lilith_iast::container::shared_vector::SharedVector<u32>>();
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

struct Backing<T> {
    id: usize,
    elements: RefCell<Vec<T>>,
}

pub struct SharedVector<T> {
    inner: Rc<Backing<T>>,
}

impl<T: Clone> SharedVector<T> {
    pub fn new(id: usize) -> Self {
        Self::with_capacity(id, 0)
    }

    pub fn with_capacity(id: usize, capacity: usize) -> Self {
        Self {
            inner: Rc::new(Backing {
                id,
                elements: RefCell::new(Vec::with_capacity(capacity)),
            }),
        }
    }

    /// Identifier assigned by the pool that created the backing store.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Handles currently sharing the backing store.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// True when both handles alias the same backing store.
    pub fn ptr_eq(&self, other: &SharedVector<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn push_back(&self, element: T) {
        self.inner.elements.borrow_mut().push(element);
    }

    /// Prepend every element of `other`, keeping their order.
    pub fn add(&self, other: &SharedVector<T>) {
        let prefix: Vec<T> = other.inner.elements.borrow().clone();
        self.inner.elements.borrow_mut().splice(0..0, prefix);
    }

    pub fn at(&self, index: usize) -> Option<T> {
        self.inner.elements.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset the length to zero, keeping the allocated capacity.
    pub fn clear(&self) {
        self.inner.elements.borrow_mut().clear();
    }

    /// Borrow the elements. Mutating the vector while the borrow is held
    /// panics, so keep it short-lived.
    pub fn as_slice(&self) -> Ref<'_, [T]> {
        Ref::map(self.inner.elements.borrow(), |v| v.as_slice())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.inner.elements.borrow().clone()
    }
}

impl<T> Clone for SharedVector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedVector")
            .field("id", &self.inner.id)
            .field("refs", &Rc::strong_count(&self.inner))
            .field("elements", &self.inner.elements.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refcount_follows_clones() {
        let v: SharedVector<u32> = SharedVector::new(7);
        assert_eq!(v.ref_count(), 1);

        let copies: Vec<_> = (0..3).map(|_| v.clone()).collect();
        assert_eq!(v.ref_count(), 4);
        assert!(copies.iter().all(|c| c.ptr_eq(&v) && c.id() == 7));

        drop(copies);
        assert_eq!(v.ref_count(), 1);
    }

    #[test]
    fn test_backing_store_survives_until_last_handle() {
        let v: SharedVector<u32> = SharedVector::new(0);
        v.push_back(1);
        let alias = v.clone();
        drop(v);
        assert_eq!(alias.ref_count(), 1);
        assert_eq!(alias.to_vec(), vec![1]);
    }

    #[test]
    fn test_push_back_visible_through_aliases() {
        let v: SharedVector<u32> = SharedVector::new(0);
        let alias = v.clone();
        v.push_back(10);
        alias.push_back(20);
        assert_eq!(v.len(), 2);
        assert_eq!(v.at(1), Some(20));
        assert_eq!(v.at(2), None);
    }

    #[test]
    fn test_add_prepends_other() {
        let head: SharedVector<u32> = SharedVector::new(0);
        head.push_back(1);
        head.push_back(2);
        let tail: SharedVector<u32> = SharedVector::new(1);
        tail.push_back(3);

        tail.add(&head);
        assert_eq!(tail.to_vec(), vec![1, 2, 3]);
        assert_eq!(head.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_add_self_alias() {
        let v: SharedVector<u32> = SharedVector::new(0);
        v.push_back(1);
        let alias = v.clone();
        v.add(&alias);
        assert_eq!(v.to_vec(), vec![1, 1]);
    }

    #[test]
    fn test_clear_keeps_sharing() {
        let v: SharedVector<u32> = SharedVector::with_capacity(0, 8);
        v.push_back(1);
        let alias = v.clone();
        v.clear();
        assert!(alias.is_empty());
        assert_eq!(alias.ref_count(), 2);
        assert_eq!(&*v.as_slice(), &[] as &[u32]);
    }
}
