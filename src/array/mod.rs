//! container types for data read from variable files

mod cell_array;
mod field_sample;

pub use cell_array::CellArray;
pub use field_sample::FieldSample;
