//! Common traits and types that are useful for working with `ensight`
#![allow(unused_imports)]

pub use crate::array::{CellArray, FieldSample};
pub use crate::data::CaseData;
pub use crate::mesh::{ElementType, MeshSnapshot, Part};
pub use crate::reader::EnsightReader;
pub use crate::session::{CaseSession, SessionConfig, SessionState};
pub use crate::time::TimeSet;
pub use crate::traits::Backend;

pub(crate) use crate::parse::ParseError;
pub(crate) use crate::Error;

pub(crate) use std::io::{Read, Write};
pub(crate) use std::path::{Path, PathBuf};

pub(crate) use derive_more::{Constructor, Deref, Display, From, Into};

pub(crate) use ndarray::{Array1, Array2, Array3};
