//! # Type Lists - Compile-Time Element Type Sequences
//!
//! A type list is an ordered, fixed, non-empty sequence of element types,
//! expressed as a Rust tuple: `(u16,)`, `(Atom, String)`, ... up to eight
//! elements. It carries no runtime state.
//!
//! - `SIZE`, `Head` and `Tail` come from [`TypeList`]
//! - `TypeAt<N>` resolves the type at index `N`
//!
//! Both bounds are enforced statically: `()` is not a type list, and there
//! is no `TypeAt<N>` implementation for `N >= SIZE`.
//!
//! ```compile_fail
//! use types::type_list::TypeAt;
//! fn third<T: TypeAt<2>>() {}
//! third::<(u8, u16)>();
//! ```
//!
//! ```compile_fail
//! use types::type_list::TypeList;
//! let _ = <() as TypeList>::SIZE;
//! ```

use crate::element::Element;
use std::any::TypeId;

/// Ordered sequence of element types
pub trait TypeList: Sized + 'static {
    /// Number of element types (always at least one)
    const SIZE: usize;

    /// First element type
    type Head: Element + Clone + PartialEq;

    /// Remaining element types; `()` for a single-element list
    type Tail;

    /// Runtime type tags, one per position
    fn type_ids() -> Vec<TypeId>;

    /// Type names, one per position
    fn type_names() -> Vec<&'static str>;

    /// Move a value tuple into erased slots, in order
    fn into_elements(self) -> Vec<Box<dyn Element>>;
}

/// Indexed type lookup within a [`TypeList`]
pub trait TypeAt<const N: usize>: TypeList {
    /// Element type at position `N`
    type Type: Element + Clone + PartialEq;
}

/// Type at index `N` of list `L`
pub type TypeAtIndex<L, const N: usize> = <L as TypeAt<N>>::Type;

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_type_list {
    ($all:tt ; $($ty:ident $idx:tt),+) => {
        impl_type_list!(@list $all);
        $(impl_type_list!(@at $all $ty $idx);)+
    };

    (@list [$head:ident $(, $tail:ident)*]) => {
        impl<$head, $($tail),*> TypeList for ($head, $($tail,)*)
        where
            $head: Element + Clone + PartialEq,
            $($tail: Element + Clone + PartialEq,)*
        {
            const SIZE: usize = count!($head $($tail)*);
            type Head = $head;
            type Tail = ($($tail,)*);

            fn type_ids() -> Vec<TypeId> {
                vec![TypeId::of::<$head>() $(, TypeId::of::<$tail>())*]
            }

            fn type_names() -> Vec<&'static str> {
                vec![std::any::type_name::<$head>() $(, std::any::type_name::<$tail>())*]
            }

            #[allow(non_snake_case)]
            fn into_elements(self) -> Vec<Box<dyn Element>> {
                let ($head, $($tail,)*) = self;
                vec![Box::new($head) as Box<dyn Element> $(, Box::new($tail) as Box<dyn Element>)*]
            }
        }
    };

    (@at [$($all:ident),+] $ty:ident $idx:tt) => {
        impl<$($all),+> TypeAt<$idx> for ($($all,)+)
        where
            $($all: Element + Clone + PartialEq,)+
        {
            type Type = $ty;
        }
    };
}

impl_type_list!([A]; A 0);
impl_type_list!([A, B]; A 0, B 1);
impl_type_list!([A, B, C]; A 0, B 1, C 2);
impl_type_list!([A, B, C, D]; A 0, B 1, C 2, D 3);
impl_type_list!([A, B, C, D, E]; A 0, B 1, C 2, D 3, E 4);
impl_type_list!([A, B, C, D, E, F]; A 0, B 1, C 2, D 3, E 4, F 5);
impl_type_list!([A, B, C, D, E, F, G]; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_type_list!([A, B, C, D, E, F, G, H]; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    fn same_type<X: 'static, Y: 'static>() -> bool {
        TypeId::of::<X>() == TypeId::of::<Y>()
    }

    #[test]
    fn test_size() {
        assert_eq!(<(u8,) as TypeList>::SIZE, 1);
        assert_eq!(<(u8, u16, u32) as TypeList>::SIZE, 3);
        assert_eq!(<(u8, u8, u8, u8, u8, u8, u8, u8) as TypeList>::SIZE, 8);
    }

    #[test]
    fn test_head_and_tail() {
        type L = (Atom, u16, String);
        assert!(same_type::<<L as TypeList>::Head, Atom>());
        assert!(same_type::<<L as TypeList>::Tail, (u16, String)>());
        assert!(same_type::<<(u8,) as TypeList>::Tail, ()>());
    }

    #[test]
    fn test_type_at() {
        type L = (Atom, u16, String);
        assert!(same_type::<TypeAtIndex<L, 0>, Atom>());
        assert!(same_type::<TypeAtIndex<L, 1>, u16>());
        assert!(same_type::<TypeAtIndex<L, 2>, String>());
    }

    #[test]
    fn test_runtime_metadata() {
        type L = (u16, String);
        assert_eq!(L::type_ids(), vec![TypeId::of::<u16>(), TypeId::of::<String>()]);
        assert_eq!(L::type_names()[0], "u16");
    }

    #[test]
    fn test_into_elements_preserves_order() {
        let elements = (1u8, String::from("two"), 3u32).into_elements();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].as_any().downcast_ref::<u8>(), Some(&1));
        assert_eq!(
            elements[1].as_any().downcast_ref::<String>().map(String::as_str),
            Some("two")
        );
        assert_eq!(elements[2].as_any().downcast_ref::<u32>(), Some(&3));
    }
}
