//! Structural equality between tuples and views
//!
//! Two tuples are equal when they have the same size and every pair of
//! corresponding elements compares equal under the elements' own runtime
//! value semantics. Static type parameters play no part: an `AnyTuple` can
//! be compared with a `TupleView<(A, B)>` or a `TupleView<(X, Y, Z)>`.

use super::{AnyTuple, TupleView};
use crate::element::Element;
use crate::type_list::TypeList;

/// Read-only element access shared by tuples and views
pub trait TupleLike {
    /// Number of elements
    fn len(&self) -> usize;

    /// True when there are no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`; panics when out of range
    fn element(&self, index: usize) -> &dyn Element;
}

impl TupleLike for AnyTuple {
    fn len(&self) -> usize {
        self.size()
    }

    fn element(&self, index: usize) -> &dyn Element {
        self.at(index)
    }
}

impl<T: TypeList> TupleLike for TupleView<T> {
    fn len(&self) -> usize {
        self.size()
    }

    fn element(&self, index: usize) -> &dyn Element {
        self.vals().at(index)
    }
}

/// Element-wise comparison; tuples of different sizes are never equal
pub fn compare_tuples<L, R>(lhs: &L, rhs: &R) -> bool
where
    L: TupleLike + ?Sized,
    R: TupleLike + ?Sized,
{
    lhs.len() == rhs.len() && (0..lhs.len()).all(|i| lhs.element(i).dyn_eq(rhs.element(i)))
}

impl PartialEq for AnyTuple {
    fn eq(&self, other: &Self) -> bool {
        compare_tuples(self, other)
    }
}

impl<L: TypeList, R: TypeList> PartialEq<TupleView<R>> for TupleView<L> {
    fn eq(&self, other: &TupleView<R>) -> bool {
        compare_tuples(self, other)
    }
}

impl<R: TypeList> PartialEq<TupleView<R>> for AnyTuple {
    fn eq(&self, other: &TupleView<R>) -> bool {
        compare_tuples(self, other)
    }
}

impl<L: TypeList> PartialEq<AnyTuple> for TupleView<L> {
    fn eq(&self, other: &AnyTuple) -> bool {
        compare_tuples(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, OK_ATOM};

    #[test]
    fn test_equal_across_static_types() {
        let a = AnyTuple::from_values((OK_ATOM, 4321u16));
        let b = AnyTuple::from_values((1u8, OK_ATOM, 4321u16));

        let va: TupleView<(Atom, u16)> = a.view(vec![0, 1]).unwrap();
        let vb: TupleView<(Atom, u16)> = b.view(vec![1, 2]).unwrap();

        assert_eq!(va, vb);
        assert_eq!(a, vb);
        assert_eq!(va, a);
        assert!(!(va != vb));
    }

    #[test]
    fn test_different_sizes_never_equal() {
        let a = AnyTuple::from_values((1u8,));
        let b = AnyTuple::from_values((1u8, 1u8));
        assert_ne!(a, b);
        assert!(!compare_tuples(&a, &b));
    }

    #[test]
    fn test_same_values_different_types_not_equal() {
        let a = TupleView::from_values((1u16,));
        let b = TupleView::from_values((1u32,));
        assert_ne!(a, b);
    }

    #[test]
    fn test_tuple_like_len_and_is_empty() {
        let t = AnyTuple::from_values((1u8, 2u8));
        let view: TupleView<(u8,)> = t.view(vec![1]).unwrap();
        assert_eq!(TupleLike::len(&t), 2);
        assert!(!TupleLike::is_empty(&t));
        assert_eq!(TupleLike::len(&view), 1);
        assert!(!TupleLike::is_empty(&view));
        assert!(TupleLike::is_empty(&AnyTuple::from_elements(Vec::new())));
    }

    #[test]
    fn test_reordered_view_compares_by_position() {
        let t = AnyTuple::from_values((1u8, 2u8));
        let swapped: TupleView<(u8, u8)> = t.view(vec![1, 0]).unwrap();
        assert_ne!(t, swapped);
        assert_eq!(swapped, TupleView::from_values((2u8, 1u8)));
    }
}
