use crate::prelude::*;

#[derive(Deref, Into, Clone, PartialEq, Default, Debug)]
/// One scalar value per mesh cell at a single timestep
///
/// Values are in the same order as the cells of the [`MeshSnapshot`](crate::MeshSnapshot)
/// the sample was read against, so `sample[i]` belongs to `mesh.triangle(i)`.
pub struct FieldSample(Array1<f64>);

impl FieldSample {
    /// Construct a `FieldSample` from an array
    pub fn new(arr: Array1<f64>) -> Self {
        Self(arr)
    }

    /// get the array that this type wraps.
    /// usually this method is not required because `FieldSample` implements
    /// [`Deref`](std::ops::Deref)
    pub fn inner(self) -> Array1<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FieldSample {
    fn from(values: Vec<f64>) -> Self {
        Self(Array1::from(values))
    }
}
