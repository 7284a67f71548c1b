use crate::iter::Timesteps;
use crate::prelude::*;
use crate::{CellCountMismatch, FieldNotFound, TimeSetCount};

/// per-cell field read when no other name is configured
pub const DEFAULT_FIELD_NAME: &str = "shading_coefficient";

/// Options that decide what a [`CaseSession`] extracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// name of the per-cell scalar field returned by
    /// [`read_timestep`](CaseSession::read_timestep)
    pub field_name: String,
    /// Index of the time set to use, counting the declared time sets in id order.
    ///
    /// `None` requires the case to declare exactly one time set.
    pub timeset_index: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            timeset_index: None,
        }
    }
}

impl SessionConfig {
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn with_timeset_index(mut self, index: usize) -> Self {
        self.timeset_index = Some(index);
        self
    }
}

/// Lifecycle stage of a [`CaseSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opened,
    MeshLoaded,
}

struct OpenCase<B> {
    path: PathBuf,
    backend: B,
}

enum State<B> {
    Unopened,
    Opened(OpenCase<B>),
    MeshLoaded(OpenCase<B>, MeshSnapshot),
}

/// Extracts a triangle mesh and a per-cell scalar field over time from one case
///
/// The session moves through three stages:
///
/// 1. [`open`](Self::open) acquires the backend for a case file
/// 2. [`mesh`](Self::mesh) freezes the triangles of the primary part into a [`MeshSnapshot`]
/// 3. [`read_timestep`](Self::read_timestep) returns one value per snapshot cell at a time
///
/// [`close`](Self::close), or dropping the session, releases the backend.
pub struct CaseSession<B: Backend = EnsightReader> {
    config: SessionConfig,
    state: State<B>,
}

impl CaseSession {
    /// Construct an unopened session that reads cases with the [`EnsightReader`].
    pub fn new(config: SessionConfig) -> Self {
        Self::with_config(config)
    }

    /// Construct a session and open `path` in one step.
    pub fn open_case(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self, Error> {
        let mut session = Self::new(config);
        session.open(path)?;
        Ok(session)
    }
}

impl<B: Backend> Default for CaseSession<B> {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl<B: Backend> CaseSession<B> {
    /// Construct an unopened session for any backend type.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            state: State::Unopened,
        }
    }

    /// Construct a session around a backend that is already open on `path`.
    pub fn from_backend(path: impl Into<PathBuf>, backend: B, config: SessionConfig) -> Self {
        let open = OpenCase {
            path: path.into(),
            backend,
        };

        Self {
            config,
            state: State::Opened(open),
        }
    }

    /// Open the case at `path`.
    ///
    /// Only the case metadata is read. Opening a session that is already open fails
    /// with [`Error::AlreadyOpen`] and keeps the current case open.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        if let Some(open) = self.open_case_ref() {
            return Err(Error::AlreadyOpen(open.path.clone()));
        }

        let path = path.as_ref();
        let backend = B::open(path)?;

        tracing::debug!(path = %path.display(), field = %self.config.field_name, "session opened");

        self.state = State::Opened(OpenCase {
            path: path.to_path_buf(),
            backend,
        });

        Ok(())
    }

    /// Release the backend and any loaded mesh. Closing an unopened session does nothing.
    pub fn close(&mut self) {
        if let State::Opened(open) | State::MeshLoaded(open, _) =
            std::mem::replace(&mut self.state, State::Unopened)
        {
            tracing::debug!(path = %open.path.display(), "session closed");
        }
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Unopened => SessionState::Unopened,
            State::Opened(_) => SessionState::Opened,
            State::MeshLoaded(..) => SessionState::MeshLoaded,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// path of the open case file
    pub fn path(&self) -> Option<&Path> {
        self.open_case_ref().map(|open| open.path.as_path())
    }

    /// The time set of the case and its number of timesteps.
    ///
    /// Without a configured index the case must declare exactly one time set.
    pub fn timeset(&self) -> Result<(TimeSet, usize), Error> {
        let open = self.open_case_ref().ok_or(Error::SessionNotOpen)?;
        let timeset = select_timeset(open.backend.time_sets(), self.config.timeset_index)?;
        Ok((timeset.clone(), timeset.len()))
    }

    /// Read the triangles of the primary part at the current time.
    ///
    /// Every call reads the geometry again and replaces the cached snapshot. The
    /// snapshot fixes the cell order of all samples read afterwards.
    pub fn mesh(&mut self) -> Result<&MeshSnapshot, Error> {
        let open = self.open_case_mut().ok_or(Error::SessionNotOpen)?;
        let part = open.backend.primary_part()?;
        let mesh = MeshSnapshot::from_part(part)?;

        tracing::debug!(cells = mesh.num_cells(), part = part.number, "mesh loaded");

        self.state = match std::mem::replace(&mut self.state, State::Unopened) {
            State::Opened(open) | State::MeshLoaded(open, _) => State::MeshLoaded(open, mesh),
            State::Unopened => State::Unopened,
        };

        self.loaded_mesh()
    }

    /// the cached snapshot, if [`mesh`](Self::mesh) was called since opening
    pub fn snapshot(&self) -> Option<&MeshSnapshot> {
        match &self.state {
            State::MeshLoaded(_, mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Read the configured field at `time`, one value per snapshot cell.
    ///
    /// Vector and tensor fields are reduced to their first component.
    pub fn read_timestep(&mut self, time: f64) -> Result<FieldSample, Error> {
        match &mut self.state {
            State::Unopened => Err(Error::SessionNotOpen),
            State::Opened(_) => Err(Error::MeshNotLoaded),
            State::MeshLoaded(open, mesh) => {
                read_sample(&mut open.backend, mesh, &self.config.field_name, time)
            }
        }
    }

    /// Iterate over every time of the selected time set, reading the field at each.
    pub fn timesteps(&mut self) -> Result<Timesteps<'_, B>, Error> {
        let (timeset, _) = self.timeset()?;
        if self.snapshot().is_none() {
            return Err(Error::MeshNotLoaded);
        }

        Ok(Timesteps::new(self, timeset.values().to_vec()))
    }

    /// Read the mesh, if not already loaded, and the field at every time of the time set.
    pub fn read_all(&mut self) -> Result<CaseData, Error> {
        if self.snapshot().is_none() {
            self.mesh()?;
        }

        let mut times = Vec::new();
        let mut samples = Vec::new();

        for (time, sample) in self.timesteps()? {
            times.push(time);
            samples.push(sample?);
        }

        let mesh = self.loaded_mesh()?.clone();
        let mut values = Array2::zeros((samples.len(), mesh.num_cells()));
        for (mut row, sample) in values.outer_iter_mut().zip(&samples) {
            row.assign(&**sample);
        }

        Ok(CaseData::new(mesh, times, values))
    }

    fn loaded_mesh(&self) -> Result<&MeshSnapshot, Error> {
        match &self.state {
            State::Unopened => Err(Error::SessionNotOpen),
            State::Opened(_) => Err(Error::MeshNotLoaded),
            State::MeshLoaded(_, mesh) => Ok(mesh),
        }
    }

    fn open_case_ref(&self) -> Option<&OpenCase<B>> {
        match &self.state {
            State::Unopened => None,
            State::Opened(open) | State::MeshLoaded(open, _) => Some(open),
        }
    }

    fn open_case_mut(&mut self) -> Option<&mut OpenCase<B>> {
        match &mut self.state {
            State::Unopened => None,
            State::Opened(open) | State::MeshLoaded(open, _) => Some(open),
        }
    }
}

fn select_timeset(time_sets: &[TimeSet], index: Option<usize>) -> Result<&TimeSet, Error> {
    match (index, time_sets) {
        (None, [only]) => Ok(only),
        (Some(index), _) if index < time_sets.len() => Ok(&time_sets[index]),
        _ => Err(TimeSetCount::new(time_sets.len(), index).into()),
    }
}

fn read_sample<B: Backend>(
    backend: &mut B,
    mesh: &MeshSnapshot,
    field: &str,
    time: f64,
) -> Result<FieldSample, Error> {
    backend.update_time(time)?;

    let array = backend
        .cell_array(field)?
        .ok_or_else(|| FieldNotFound::new(field.to_string(), backend.cell_array_names()))?;

    if array.num_cells() != mesh.num_cells() {
        return Err(CellCountMismatch::new(mesh.num_cells(), array.num_cells(), time).into());
    }

    tracing::trace!(field, time, cells = array.num_cells(), "read timestep");

    Ok(array.first_component())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_sets(count: usize) -> Vec<TimeSet> {
        (0..count)
            .map(|id| TimeSet::new(id as u32 + 1, vec![id as f64]))
            .collect()
    }

    #[test]
    fn single_timeset_is_selected() {
        let sets = time_sets(1);
        assert_eq!(select_timeset(&sets, None).unwrap().id, 1);
    }

    #[test]
    fn several_timesets_need_an_index() {
        let sets = time_sets(3);

        let err = select_timeset(&sets, None).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedTimeSetCount(TimeSetCount { found: 3, requested: None })
        ));

        assert_eq!(select_timeset(&sets, Some(2)).unwrap().id, 3);
    }

    #[test]
    fn index_out_of_range() {
        let sets = time_sets(2);
        let err = select_timeset(&sets, Some(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedTimeSetCount(TimeSetCount { found: 2, requested: Some(2) })
        ));
    }

    #[test]
    fn no_timeset_is_unsupported() {
        let err = select_timeset(&[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedTimeSetCount(TimeSetCount { found: 0, .. })
        ));
    }

    #[test]
    fn config_builders() {
        let config = SessionConfig::default()
            .with_field_name("irradiance")
            .with_timeset_index(1);

        assert_eq!(config.field_name, "irradiance");
        assert_eq!(config.timeset_index, Some(1));
        assert_eq!(SessionConfig::default().field_name, DEFAULT_FIELD_NAME);
    }
}
