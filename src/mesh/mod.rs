//! # Mesh Information
//!
//! Ensight Gold geometry is stored as a list of *parts*. Each part owns its own node
//! coordinates and one or more *element blocks*, each block a run of cells of a single
//! [`ElementType`]. [`Geometry`] is the full contents of a geometry file as read by
//! [`parse`](crate::parse), and is also what [`write_ensight`](crate::write_ensight) writes.
//!
//! The extraction side of the crate only ever looks at a single part (the first one in
//! the file, see [`Geometry::primary_part`]) and flattens it into a [`MeshSnapshot`]: a
//! `(cells, 3, 3)` array of triangle vertex coordinates. The order of the cells in the
//! snapshot is the order of the blocks in the file, and within a block the order of the
//! elements. Per-cell field values read later follow exactly the same order.
//!
//! Only surface triangles can be flattened. A part containing any other kind of cell is
//! rejected with an [`UnsupportedCellShape`] error naming the first offending cell. Cells
//! that reference nodes the part does not have are a [`MalformedPart`].

mod element;
mod part;
mod snapshot;

pub use element::ElementType;
pub use part::{Cell, ElementBlock, Faces, Geometry, IdMode, Part};
pub use snapshot::{MalformedPart, MeshSnapshot, UnsupportedCellShape};
