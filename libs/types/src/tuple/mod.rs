//! # Message Tuples - Shared, Type-Erased Element Storage
//!
//! Actors exchange messages as tuples. A tuple is authored once, then shared
//! by every actor and every view that receives it without copying payloads.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────────────┐
//! │ TupleView<(B,A)> │      │ AnyTuple (Arc handle)    │
//! │  mapping [1, 0]  │─────▶│  ┌────────────────────┐  │
//! └──────────────────┘      │  │ ValueTuple         │  │
//! ┌──────────────────┐      │  │  [0] Box<dyn A>    │  │
//! │ TupleView<(A,)>  │─────▶│  │  [1] Box<dyn B>    │  │
//! │  mapping [0]     │      │  └────────────────────┘  │
//! └──────────────────┘      └──────────────────────────┘
//! ```
//!
//! - [`ErasedTuple`]: per-element interface (`at`, `mutable_at`, `size`)
//! - [`ValueTuple`]: owns its elements
//! - [`DecoratedTuple`]: index mapping over another tuple (the storage of a view)
//! - [`AnyTuple`]: reference-counted handle; cloning it is a refcount increment
//! - [`TupleView`]: statically typed, reordering/sub-setting projection
//!
//! ## Sharing and Mutation
//!
//! Storage is shared immutably. A write through any handle first detaches
//! that handle: when the storage has more than one owner it is cloned, so
//! the write is never observed by another alias. `&mut self` on every
//! mutating accessor rules out concurrent readers of the same handle.
//!
//! ## Contract Violations
//!
//! Out-of-range indices and type mismatches are programming errors. The plain
//! accessors panic with a [`TupleError`] message; `try_*` accessors and view
//! constructors return the error instead.

pub mod compare;
pub mod decorated;
pub mod store;
pub mod view;

pub use compare::{compare_tuples, TupleLike};
pub use decorated::DecoratedTuple;
pub use store::{AnyTuple, ValueTuple};
pub use view::{get, get_mut, TupleView};

use crate::common::errors::TupleError;
use crate::element::Element;
use std::any::TypeId;
use std::fmt::Debug;

/// Abstract per-element interface of a tuple store
///
/// `size()` never changes after construction.
pub trait ErasedTuple: Send + Sync + Debug {
    /// Number of slots
    fn size(&self) -> usize;

    /// Immutable access to slot `index`; panics if `index >= size()`
    fn at(&self, index: usize) -> &dyn Element;

    /// Mutable access to slot `index`; panics if `index >= size()`
    fn mutable_at(&mut self, index: usize) -> &mut dyn Element;

    /// Independent copy of this store
    fn copy(&self) -> Box<dyn ErasedTuple>;

    /// Runtime type tag of slot `index`
    fn type_at(&self, index: usize) -> TypeId {
        self.at(index).element_type_id()
    }
}

/// Panic with an index diagnostic when `index` is not a slot
#[inline]
#[track_caller]
pub(crate) fn check_index(index: usize, size: usize) {
    if index >= size {
        panic!("{}", TupleError::index_out_of_range(index, size));
    }
}
