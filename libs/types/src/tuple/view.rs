//! # Typed Views - Statically Typed Projections of Shared Tuples
//!
//! A `TupleView<T>` reads a shared tuple as the type list `T`, selecting and
//! reordering elements through an index mapping without copying storage.
//!
//! ```rust
//! use types::tuple::{AnyTuple, TupleView};
//!
//! let msg = AnyTuple::from_values((1u8, String::from("two"), 3u32));
//! let view: TupleView<(u32, u8)> = TupleView::new(&msg, vec![2, 0]).unwrap();
//! assert_eq!(*view.get::<0>(), 3);
//! assert_eq!(*view.get::<1>(), 1);
//! ```
//!
//! Construction checks the mapping length, every mapping entry, and every
//! projected slot's type tag. Indexing with `get::<N>()` is bounded by
//! `TypeAt<N>` at compile time and re-checks the slot's type tag at runtime.

use super::{AnyTuple, DecoratedTuple};
use crate::common::errors::{TupleError, TupleResult};
use crate::element::Element;
use crate::type_list::{TypeAt, TypeAtIndex, TypeList};
use std::fmt;
use std::marker::PhantomData;

/// Statically typed projection over shared tuple storage
pub struct TupleView<T: TypeList> {
    vals: AnyTuple,
    _types: PhantomData<fn() -> T>,
}

impl<T: TypeList> TupleView<T> {
    /// Project `vals` through `mapping`
    ///
    /// `mapping[k]` is the slot of `vals` read as position `k` of `T`.
    pub fn new(vals: &AnyTuple, mapping: Vec<usize>) -> TupleResult<Self> {
        if mapping.len() != T::SIZE {
            return Err(TupleError::SizeMismatch {
                expected: T::SIZE,
                actual: mapping.len(),
            });
        }

        let expected_ids = T::type_ids();
        let expected_names = T::type_names();
        for (position, &index) in mapping.iter().enumerate() {
            let slot = vals.try_at(index)?;
            if slot.element_type_id() != expected_ids[position] {
                return Err(TupleError::type_mismatch(
                    position,
                    expected_names[position],
                    slot.element_type_name(),
                ));
            }
        }

        let decorated = DecoratedTuple::new(vals.clone(), mapping)?;
        Ok(Self {
            vals: AnyTuple::from_store(decorated),
            _types: PhantomData,
        })
    }

    /// View over a freshly authored tuple, in declaration order
    pub fn from_values(values: T) -> Self {
        Self {
            vals: AnyTuple::from_values(values),
            _types: PhantomData,
        }
    }

    /// Number of elements seen through this view
    pub fn size(&self) -> usize {
        self.vals.size()
    }

    /// Static element type names
    pub fn types(&self) -> Vec<&'static str> {
        T::type_names()
    }

    /// Erased handle backing this view
    pub fn vals(&self) -> &AnyTuple {
        &self.vals
    }

    /// Give up the static types
    pub fn into_vals(self) -> AnyTuple {
        self.vals
    }

    /// Element `N`
    ///
    /// # Panics
    /// If the slot does not hold `TypeAtIndex<T, N>`.
    #[track_caller]
    pub fn get<const N: usize>(&self) -> &TypeAtIndex<T, N>
    where
        T: TypeAt<N>,
    {
        let slot = self.vals.at(N);
        match slot.as_any().downcast_ref::<TypeAtIndex<T, N>>() {
            Some(value) => value,
            None => panic!(
                "{}",
                TupleError::type_mismatch(
                    N,
                    std::any::type_name::<TypeAtIndex<T, N>>(),
                    slot.element_type_name()
                )
            ),
        }
    }

    /// Checked counterpart of [`get`](Self::get)
    pub fn try_get<const N: usize>(&self) -> TupleResult<&TypeAtIndex<T, N>>
    where
        T: TypeAt<N>,
    {
        let slot = self.vals.try_at(N)?;
        slot.as_any()
            .downcast_ref::<TypeAtIndex<T, N>>()
            .ok_or_else(|| {
                TupleError::type_mismatch(
                    N,
                    std::any::type_name::<TypeAtIndex<T, N>>(),
                    slot.element_type_name(),
                )
            })
    }

    /// Mutable element `N`
    ///
    /// Shared storage is detached first, so the write is private to this view.
    ///
    /// # Panics
    /// If the slot does not hold `TypeAtIndex<T, N>`.
    #[track_caller]
    pub fn get_mut<const N: usize>(&mut self) -> &mut TypeAtIndex<T, N>
    where
        T: TypeAt<N>,
    {
        let slot = self.vals.mutable_at(N);
        let actual = slot.element_type_name();
        match slot.as_any_mut().downcast_mut::<TypeAtIndex<T, N>>() {
            Some(value) => value,
            None => panic!(
                "{}",
                TupleError::type_mismatch(N, std::any::type_name::<TypeAtIndex<T, N>>(), actual)
            ),
        }
    }
}

/// Element `N` of `view`
#[track_caller]
pub fn get<const N: usize, T>(view: &TupleView<T>) -> &TypeAtIndex<T, N>
where
    T: TypeAt<N>,
{
    view.get::<N>()
}

/// Mutable element `N` of `view`
#[track_caller]
pub fn get_mut<const N: usize, T>(view: &mut TupleView<T>) -> &mut TypeAtIndex<T, N>
where
    T: TypeAt<N>,
{
    view.get_mut::<N>()
}

impl<T: TypeList> Clone for TupleView<T> {
    fn clone(&self) -> Self {
        Self {
            vals: self.vals.clone(),
            _types: PhantomData,
        }
    }
}

impl<T: TypeList> fmt::Debug for TupleView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = f.debug_tuple("TupleView");
        for index in 0..self.vals.size() {
            t.field(&self.vals.at(index));
        }
        t.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, ERROR_ATOM};

    fn message() -> AnyTuple {
        AnyTuple::from_values((ERROR_ATOM, String::from("address already in use"), 8080u16))
    }

    #[test]
    fn test_identity_view() {
        let msg = message();
        let view: TupleView<(Atom, String, u16)> = TupleView::new(&msg, vec![0, 1, 2]).unwrap();
        assert_eq!(view.size(), 3);
        assert_eq!(*view.get::<0>(), ERROR_ATOM);
        assert_eq!(view.get::<1>(), "address already in use");
        assert_eq!(*get::<2, _>(&view), 8080);
    }

    #[test]
    fn test_reordered_subset_view() {
        let msg = message();
        let view: TupleView<(u16, Atom)> = msg.view(vec![2, 0]).unwrap();
        assert_eq!(view.size(), 2);
        assert_eq!(*view.get::<0>(), 8080);
        assert_eq!(*view.get::<1>(), ERROR_ATOM);
        assert_eq!(view.types(), vec!["u16", std::any::type_name::<Atom>()]);
    }

    #[test]
    fn test_view_shares_storage() {
        let msg = message();
        let view: TupleView<(u16,)> = msg.view(vec![2]).unwrap();
        assert_eq!(msg.ref_count(), 2);
        drop(view);
        assert_eq!(msg.ref_count(), 1);
    }

    #[test]
    fn test_rejects_wrong_mapping_length() {
        let err = TupleView::<(Atom, String)>::new(&message(), vec![0]).unwrap_err();
        assert_eq!(err, TupleError::SizeMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let err = TupleView::<(Atom, String)>::new(&message(), vec![0, 3]).unwrap_err();
        assert_eq!(err, TupleError::IndexOutOfRange { index: 3, size: 3 });
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let err = TupleView::<(Atom, u16)>::new(&message(), vec![0, 1]).unwrap_err();
        assert!(matches!(err, TupleError::TypeMismatch { position: 1, expected: "u16", .. }));
    }

    #[test]
    fn test_get_mut_is_private_to_view() {
        let msg = message();
        let mut view: TupleView<(String,)> = msg.view(vec![1]).unwrap();
        let other = view.clone();

        get_mut::<0, _>(&mut view).push_str("!");

        assert_eq!(view.get::<0>(), "address already in use!");
        assert_eq!(other.get::<0>(), "address already in use");
        assert_eq!(msg.get_as::<String>(1).map(String::as_str), Some("address already in use"));
    }

    #[test]
    fn test_try_get() {
        let view = TupleView::from_values((1u8, 2u16));
        assert_eq!(view.try_get::<1>(), Ok(&2u16));
    }

    #[test]
    fn test_into_vals_round_trip() {
        let view = TupleView::from_values((OkMarker, 5i64));
        let vals: AnyTuple = view.into();
        assert!(vals.matches::<(OkMarker, i64)>());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct OkMarker;
}
