//! # Traits
//!
//! [`Backend`] is the seam between a [`CaseSession`](crate::CaseSession) and the code that
//! actually reads files. The [`EnsightReader`](crate::EnsightReader) is the implementation
//! used by default, tests inject in-memory backends through
//! [`CaseSession::from_backend`](crate::CaseSession::from_backend).

use crate::prelude::*;

/// Reads mesh and per-cell data of a case at a selectable time
///
/// A backend is opened once on a case path and then moved between times with
/// [`update_time`](Backend::update_time). [`primary_part`](Backend::primary_part) and
/// [`cell_array`](Backend::cell_array) always reflect the current time.
pub trait Backend: Sized {
    /// Open the case at `path`, reading only its metadata.
    fn open(path: &Path) -> Result<Self, Error>;

    /// all time sets declared by the case, ordered by id
    fn time_sets(&self) -> &[TimeSet];

    /// The first part of the geometry at the current time.
    ///
    /// The geometry may be read lazily, which is why this can fail.
    fn primary_part(&mut self) -> Result<&Part, Error>;

    /// Seek to `time`, refreshing geometry and data where they change.
    fn update_time(&mut self, time: f64) -> Result<(), Error>;

    /// Per-cell values of `name` on the primary part at the current time.
    ///
    /// Returns `Ok(None)` if the case has no per-cell array with that name.
    fn cell_array(&mut self, name: &str) -> Result<Option<CellArray>, Error>;

    /// names of every per-cell array the case declares
    fn cell_array_names(&self) -> Vec<String>;
}
