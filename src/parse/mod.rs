//! reading and parsing Ensight Gold files
//!
//! most of the time you will not need to interact with this module, the
//! [`EnsightReader`](crate::EnsightReader) drives it for you. It is public so the
//! individual file types can be read on their own:
//!
//! * [`parse_case`] reads the text `.case` index
//! * [`read_geometry`] reads a C Binary geometry file into a [`Geometry`](crate::mesh::Geometry)
//! * [`apply_coordinates`] moves the nodes of a geometry for `change_coords_only` cases
//! * [`read_element_variable`] reads the per-element values of one part from a variable file
//!
//! Only the C Binary encoding is supported. Integers and floats are 32 bit, and the
//! byte order is detected from the geometry file (see [`Endian::detect`]).

mod binary;
mod case_file;
mod error;
mod geometry;
mod variable;

pub use binary::{Endian, LINE_LENGTH};
pub use case_file::parse_case;
pub use error::*;
pub use geometry::{apply_coordinates, check_header, read_geometry};
pub use variable::read_element_variable;
