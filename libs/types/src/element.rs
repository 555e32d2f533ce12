//! Type-erased tuple elements
//!
//! Every slot of a tuple store holds a `Box<dyn Element>`. The trait object
//! keeps the runtime type tag of the value next to it, so typed access can
//! be checked instead of reinterpreting memory.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// A value that can live in an erased tuple slot
///
/// Implemented for every `'static + Send + Sync + Debug + Clone + PartialEq`
/// type; there is no need to implement it by hand.
pub trait Element: Any + Send + Sync + Debug {
    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as `Any` for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Runtime type tag of the stored value
    fn element_type_id(&self) -> TypeId;

    /// Name of the stored type, for diagnostics
    fn element_type_name(&self) -> &'static str;

    /// Value equality against another erased element
    ///
    /// Elements of different types are never equal.
    fn dyn_eq(&self, other: &dyn Element) -> bool;

    /// Deep copy into a new slot
    fn clone_element(&self) -> Box<dyn Element>;
}

impl<T> Element for T
where
    T: Any + Send + Sync + Debug + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn dyn_eq(&self, other: &dyn Element) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn clone_element(&self) -> Box<dyn Element> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Element> {
    fn clone(&self) -> Self {
        self.as_ref().clone_element()
    }
}
