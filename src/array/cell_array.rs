use crate::prelude::*;

#[derive(Deref, Into, Clone, PartialEq, Default, Debug)]
/// Array container for per-cell data as handed out by a [`Backend`](crate::Backend)
///
/// The first axis is the cell index and the second axis the component: scalars have a
/// single component, vectors three, and symmetric / asymmetric tensors six / nine.
///
/// ## Example
///
/// A velocity field over 100 cells has shape `(100, 3)`.
pub struct CellArray(Array2<f64>);

impl CellArray {
    /// Construct a `CellArray` from an array of shape `(cells, components)`.
    ///
    /// Returns `None` if the array has no components.
    pub fn new(arr: Array2<f64>) -> Option<Self> {
        if arr.ncols() == 0 {
            None
        } else {
            Some(Self(arr))
        }
    }

    /// Construct a single component array from one value per cell
    pub fn scalar(values: Vec<f64>) -> Self {
        Self(Array1::from(values).insert_axis(ndarray::Axis(1)))
    }

    pub fn num_cells(&self) -> usize {
        self.0.nrows()
    }

    pub fn components(&self) -> usize {
        self.0.ncols()
    }

    /// The first component of every tuple, which is the scalar value for scalar
    /// fields and the `x` component for vectors
    pub fn first_component(&self) -> FieldSample {
        FieldSample::new(self.0.column(0).to_owned())
    }

    /// get the array that this type wraps
    pub fn inner(self) -> Array2<f64> {
        self.0
    }
}
