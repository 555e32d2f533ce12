//! Index-mapped tuple storage
//!
//! A `DecoratedTuple` exposes a subset and/or permutation of another tuple's
//! slots. Logical slot `k` is physical slot `mapping[k]` of the decorated
//! tuple. The mapping is fixed at construction.

use super::{check_index, AnyTuple, ErasedTuple};
use crate::common::errors::{TupleError, TupleResult};
use crate::element::Element;

/// Tuple store projecting another tuple through an index mapping
#[derive(Debug, Clone)]
pub struct DecoratedTuple {
    decorated: AnyTuple,
    mapping: Vec<usize>,
}

impl DecoratedTuple {
    /// Create a projection of `decorated`
    ///
    /// Every mapping entry must name a slot of `decorated`.
    pub fn new(decorated: AnyTuple, mapping: Vec<usize>) -> TupleResult<Self> {
        let size = decorated.size();
        if let Some(&index) = mapping.iter().find(|&&index| index >= size) {
            return Err(TupleError::index_out_of_range(index, size));
        }
        Ok(Self { decorated, mapping })
    }

    /// Physical slot of every logical position
    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }

    /// The projected tuple
    pub fn decorated(&self) -> &AnyTuple {
        &self.decorated
    }
}

impl ErasedTuple for DecoratedTuple {
    fn size(&self) -> usize {
        self.mapping.len()
    }

    fn at(&self, index: usize) -> &dyn Element {
        check_index(index, self.mapping.len());
        self.decorated.at(self.mapping[index])
    }

    fn mutable_at(&mut self, index: usize) -> &mut dyn Element {
        check_index(index, self.mapping.len());
        let physical = self.mapping[index];
        self.decorated.mutable_at(physical)
    }

    // The projected storage stays shared; it detaches lazily on first write.
    fn copy(&self) -> Box<dyn ErasedTuple> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnyTuple {
        AnyTuple::from_values((10u8, 20u16, 30u32))
    }

    #[test]
    fn test_projection_reorders() {
        let d = DecoratedTuple::new(sample(), vec![2, 0]).unwrap();
        assert_eq!(d.size(), 2);
        assert_eq!(d.at(0).as_any().downcast_ref::<u32>(), Some(&30));
        assert_eq!(d.at(1).as_any().downcast_ref::<u8>(), Some(&10));
        assert_eq!(d.mapping(), &[2, 0]);
    }

    #[test]
    fn test_rejects_out_of_range_mapping() {
        let err = DecoratedTuple::new(sample(), vec![0, 3]).unwrap_err();
        assert_eq!(err, TupleError::IndexOutOfRange { index: 3, size: 3 });
    }

    #[test]
    fn test_write_does_not_leak_into_source() {
        let source = sample();
        let mut d = DecoratedTuple::new(source.clone(), vec![1]).unwrap();

        if let Some(v) = d.mutable_at(0).as_any_mut().downcast_mut::<u16>() {
            *v = 99;
        }

        assert_eq!(d.at(0).as_any().downcast_ref::<u16>(), Some(&99));
        assert_eq!(source.get_as::<u16>(1), Some(&20));
        assert!(!d.decorated().ptr_eq(&source));
    }

    #[test]
    #[should_panic(expected = "Index out of range: index 1 >= size 1")]
    fn test_at_beyond_mapping_panics() {
        let d = DecoratedTuple::new(sample(), vec![2]).unwrap();
        let _ = d.at(1);
    }
}
