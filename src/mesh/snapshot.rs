use crate::prelude::*;

use super::{Cell, ElementType, Part};

#[derive(Deref, Into, Clone, PartialEq, Debug)]
/// Triangle coordinates of a mesh, frozen at the moment they were read
///
/// The wrapped array has shape `(cells, 3, 3)`: the first axis is the cell, the second the
/// vertex of the triangle, and the third the `x`, `y`, `z` coordinate of that vertex. The
/// order of the first axis is the order every [`FieldSample`](crate::FieldSample) follows.
pub struct MeshSnapshot(Array3<f64>);

impl MeshSnapshot {
    /// Build a snapshot from an array with shape `(cells, 3, 3)`.
    ///
    /// Returns `None` for any other shape.
    pub fn new(arr: Array3<f64>) -> Option<Self> {
        match arr.shape() {
            [_, 3, 3] => Some(Self(arr)),
            _ => None,
        }
    }

    /// Copy the triangles of a part into a snapshot.
    ///
    /// Every cell must be a surface triangle with exactly 3 points, otherwise the
    /// offending cell is reported with [`Error::UnsupportedCellShape`]. Parts without three
    /// coordinate columns, or with cells referencing missing nodes, fail with
    /// [`Error::MalformedPart`].
    pub fn from_part(part: &Part) -> Result<Self, Error> {
        let columns = part.coordinates.ncols();
        if columns != 3 {
            let reason = format!("coordinates have {columns} columns instead of 3");
            return Err(MalformedPart::new(part.number, reason).into());
        }

        let mut arr = Array3::zeros((part.num_cells(), 3, 3));

        for (index, cell) in part.cells().enumerate() {
            check_triangle(index, &cell)?;

            for (vertex, node) in cell.nodes.iter().enumerate() {
                let point = part.point(*node).ok_or_else(|| {
                    let reason = format!(
                        "cell {index} references node {node}, but the part has {} nodes",
                        part.num_nodes()
                    );
                    MalformedPart::new(part.number, reason)
                })?;

                for (axis, value) in point.into_iter().enumerate() {
                    arr[[index, vertex, axis]] = value;
                }
            }
        }

        Ok(Self(arr))
    }

    /// number of triangles in the mesh
    pub fn num_cells(&self) -> usize {
        self.0.len_of(ndarray::Axis(0))
    }

    /// coordinates of the three vertices of a triangle
    pub fn triangle(&self, cell: usize) -> [[f64; 3]; 3] {
        let tri = self.0.index_axis(ndarray::Axis(0), cell);
        [
            [tri[[0, 0]], tri[[0, 1]], tri[[0, 2]]],
            [tri[[1, 0]], tri[[1, 1]], tri[[1, 2]]],
            [tri[[2, 0]], tri[[2, 1]], tri[[2, 2]]],
        ]
    }

    /// get the array that this type wraps
    pub fn inner(self) -> Array3<f64> {
        self.0
    }
}

impl Default for MeshSnapshot {
    fn default() -> Self {
        Self(Array3::zeros((0, 3, 3)))
    }
}

fn check_triangle(index: usize, cell: &Cell<'_>) -> Result<(), UnsupportedCellShape> {
    // quadratic triangles carry 6 points and are excluded by the count
    let is_triangle = cell.nodes.len() == 3 && cell.element.is_polygon();

    if is_triangle {
        Ok(())
    } else {
        Err(UnsupportedCellShape::new(index, cell.element, cell.nodes.len()))
    }
}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(
    fmt = "cell {cell} is a `{element}` with {points} points, only triangles with exactly 3 points are supported"
)]
pub struct UnsupportedCellShape {
    pub cell: usize,
    pub element: ElementType,
    pub points: usize,
}

#[derive(Display, Debug, Clone, PartialEq, Eq, Constructor)]
#[display(fmt = "part {part} cannot be read as a mesh: {reason}")]
pub struct MalformedPart {
    pub part: i32,
    pub reason: String,
}
