//! Owning tuple storage and the shared handle over it

use super::{check_index, ErasedTuple, TupleView};
use crate::common::errors::{TupleError, TupleResult};
use crate::element::Element;
use crate::type_list::TypeList;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Tuple store owning a fixed sequence of erased elements
#[derive(Debug, Clone)]
pub struct ValueTuple {
    elements: Vec<Box<dyn Element>>,
}

impl ValueTuple {
    /// Create a store from already erased elements
    pub fn new(elements: Vec<Box<dyn Element>>) -> Self {
        Self { elements }
    }

    /// Create a store from a value tuple
    pub fn from_values<T: TypeList>(values: T) -> Self {
        Self::new(values.into_elements())
    }
}

impl ErasedTuple for ValueTuple {
    fn size(&self) -> usize {
        self.elements.len()
    }

    fn at(&self, index: usize) -> &dyn Element {
        check_index(index, self.elements.len());
        self.elements[index].as_ref()
    }

    fn mutable_at(&mut self, index: usize) -> &mut dyn Element {
        check_index(index, self.elements.len());
        self.elements[index].as_mut()
    }

    fn copy(&self) -> Box<dyn ErasedTuple> {
        Box::new(self.clone())
    }
}

/// Reference-counted handle to tuple storage
///
/// Every message and every [`TupleView`] holds one of these. Cloning shares
/// the storage; the storage is dropped with its last handle.
#[derive(Clone)]
pub struct AnyTuple {
    vals: Arc<dyn ErasedTuple>,
}

impl AnyTuple {
    /// Wrap a store in a new handle
    pub fn from_store<S: ErasedTuple + 'static>(store: S) -> Self {
        Self {
            vals: Arc::new(store),
        }
    }

    /// Build a tuple from typed values
    ///
    /// ```rust
    /// use types::tuple::AnyTuple;
    ///
    /// let msg = AnyTuple::from_values((7u16, String::from("x")));
    /// assert_eq!(msg.size(), 2);
    /// ```
    pub fn from_values<T: TypeList>(values: T) -> Self {
        Self::from_store(ValueTuple::from_values(values))
    }

    /// Build a tuple from already erased elements
    pub fn from_elements(elements: Vec<Box<dyn Element>>) -> Self {
        Self::from_store(ValueTuple::new(elements))
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.vals.size()
    }

    /// True when the tuple has no elements
    pub fn is_empty(&self) -> bool {
        self.vals.size() == 0
    }

    /// Immutable access to element `index`
    ///
    /// # Panics
    /// If `index >= size()`.
    #[track_caller]
    pub fn at(&self, index: usize) -> &dyn Element {
        check_index(index, self.vals.size());
        self.vals.at(index)
    }

    /// Checked immutable access to element `index`
    pub fn try_at(&self, index: usize) -> TupleResult<&dyn Element> {
        if index >= self.vals.size() {
            return Err(TupleError::index_out_of_range(index, self.vals.size()));
        }
        Ok(self.vals.at(index))
    }

    /// Runtime type tag of element `index`
    #[track_caller]
    pub fn type_at(&self, index: usize) -> TypeId {
        check_index(index, self.vals.size());
        self.vals.type_at(index)
    }

    /// Element `index` as a concrete type, if it holds one
    pub fn get_as<V: Element>(&self, index: usize) -> Option<&V> {
        self.try_at(index).ok()?.as_any().downcast_ref::<V>()
    }

    /// Mutable access to element `index`
    ///
    /// Detaches first: if the storage is shared with another handle it is
    /// cloned, so the write stays private to this handle.
    ///
    /// # Panics
    /// If `index >= size()`.
    #[track_caller]
    pub fn mutable_at(&mut self, index: usize) -> &mut dyn Element {
        check_index(index, self.vals.size());
        self.detach().mutable_at(index)
    }

    /// True when another handle shares this storage
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.vals) > 1
    }

    /// Number of handles sharing this storage
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.vals)
    }

    /// True when both handles point at the same storage
    pub fn ptr_eq(&self, other: &AnyTuple) -> bool {
        Arc::ptr_eq(&self.vals, &other.vals)
    }

    /// True when the element types are exactly `T`, in order
    pub fn matches<T: TypeList>(&self) -> bool {
        self.size() == T::SIZE
            && T::type_ids()
                .iter()
                .enumerate()
                .all(|(index, id)| self.vals.type_at(index) == *id)
    }

    /// Typed view over the whole tuple, if the element types are exactly `T`
    pub fn downcast<T: TypeList>(&self) -> Option<TupleView<T>> {
        if !self.matches::<T>() {
            return None;
        }
        TupleView::new(self, (0..T::SIZE).collect()).ok()
    }

    /// Typed view selecting and reordering elements through `mapping`
    pub fn view<T: TypeList>(&self, mapping: Vec<usize>) -> TupleResult<TupleView<T>> {
        TupleView::new(self, mapping)
    }

    fn detach(&mut self) -> &mut dyn ErasedTuple {
        if Arc::get_mut(&mut self.vals).is_none() {
            trace!(
                size = self.vals.size(),
                owners = Arc::strong_count(&self.vals),
                "Detaching shared tuple storage before write"
            );
            self.vals = Arc::from(self.vals.copy());
        }
        match Arc::get_mut(&mut self.vals) {
            Some(vals) => vals,
            None => unreachable!("freshly copied tuple storage has a single owner"),
        }
    }
}

impl fmt::Debug for AnyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = f.debug_tuple("AnyTuple");
        for index in 0..self.vals.size() {
            t.field(&self.vals.at(index));
        }
        t.finish()
    }
}

impl<T: TypeList> From<TupleView<T>> for AnyTuple {
    fn from(view: TupleView<T>) -> Self {
        view.into_vals()
    }
}
