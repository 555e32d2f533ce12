//! # Actor Message Types Library
//!
//! Message representation for the actor runtime: typed values authored once,
//! shared by every actor that receives them, and read back through
//! statically typed views.
//!
//! ## Design Philosophy
//!
//! - **Share, Don't Copy**: Messages are reference-counted tuples; forwarding is a refcount increment
//! - **Checked Erasure**: Every erased slot keeps its runtime type tag and is checked on typed access
//! - **Static Indexing**: Element positions are bounded at compile time through type lists
//! - **Copy-on-Write**: Writes detach shared storage, so aliases never observe each other's mutations
//! - **Integer Tags**: Message discriminants are 64-bit atoms compared like integers
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{AnyTuple, Atom, TupleView, OK_ATOM};
//!
//! // Author a tagged message
//! let reply = AnyTuple::from_values((OK_ATOM, 4321u16));
//!
//! // Match it against an expected shape
//! let ok: TupleView<(Atom, u16)> = reply.downcast().unwrap();
//! assert_eq!(*ok.get::<0>(), OK_ATOM);
//! assert_eq!(*ok.get::<1>(), 4321);
//!
//! // Project a subset without copying
//! let port: TupleView<(u16,)> = reply.view(vec![1]).unwrap();
//! assert_eq!(*port.get::<0>(), 4321);
//! ```
//!
//! ## Modules
//!
//! - [`atom`]: 6-bit packed text tags
//! - [`type_list`]: compile-time element type sequences
//! - [`element`]: type-erased element slots
//! - [`tuple`]: shared tuple storage, typed views, equality
//! - [`common`]: actor identifiers and error types

pub mod atom;
pub mod common;
pub mod element;
pub mod tuple;
pub mod type_list;

pub use atom::{Atom, DELETE_ATOM, ERROR_ATOM, OK_ATOM, PUT_ATOM};
pub use common::errors::{TupleError, TupleResult};
pub use common::identifiers::ActorId;
pub use element::Element;
pub use tuple::{
    compare_tuples, get, get_mut, AnyTuple, DecoratedTuple, ErasedTuple, TupleLike, TupleView,
    ValueTuple,
};
pub use type_list::{TypeAt, TypeAtIndex, TypeList};
