use crate::case::{CaseFile, VariableSource};
use crate::mesh::Geometry;
use crate::parse::{self, Endian, MissingEntry};
use crate::prelude::*;

use std::fs::File;
use std::io::BufReader;

/// The built-in [`Backend`] for Ensight Gold cases with C Binary geometry and variables
///
/// Opening only reads the `.case` file and checks the header of the geometry file. The
/// geometry itself is read on first use and kept until the file it resolves to at the
/// current time changes. For `change_coords_only` cases the element blocks are read once
/// from the connectivity step and later files only replace the node coordinates.
#[derive(Debug)]
pub struct EnsightReader {
    path: PathBuf,
    dir: PathBuf,
    case: CaseFile,
    time: f64,
    geometry: Option<LoadedGeometry>,
    /// geometry of the connectivity step of a `change_coords_only` case
    connectivity: Option<LoadedGeometry>,
}

#[derive(Debug)]
struct LoadedGeometry {
    path: PathBuf,
    geometry: Geometry,
    endian: Endian,
}

impl LoadedGeometry {
    fn read(path: PathBuf) -> Result<Self, Error> {
        tracing::debug!(path = %path.display(), "loading geometry");

        let file = File::open(&path).map_err(|e| Error::read(&path, e))?;
        let (geometry, endian) =
            parse::read_geometry(BufReader::new(file)).map_err(|e| Error::read(&path, e))?;

        Ok(Self {
            path,
            geometry,
            endian,
        })
    }
}

impl EnsightReader {
    /// the parsed contents of the `.case` file
    pub fn case(&self) -> &CaseFile {
        &self.case
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// the time the reader currently points at
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The complete geometry at the current time, with every part.
    pub fn geometry(&mut self) -> Result<&Geometry, Error> {
        Ok(&self.load_geometry()?.geometry)
    }

    fn resolve(&self, filename: &str, time_set: Option<u32>) -> PathBuf {
        self.dir
            .join(self.case.filename_at(filename, time_set, self.time))
    }

    fn geometry_path(&self) -> PathBuf {
        let entry = &self.case.geometry;
        self.resolve(&entry.filename, entry.time_set)
    }

    fn connectivity_path(&self) -> PathBuf {
        let entry = &self.case.geometry;
        let step = entry.connectivity_step.unwrap_or(0);
        self.dir
            .join(self.case.filename_at_step(&entry.filename, entry.time_set, step))
    }

    fn load_geometry(&mut self) -> Result<&LoadedGeometry, Error> {
        let path = self.geometry_path();

        let loaded = match self.geometry.take() {
            Some(loaded) if loaded.path == path => loaded,
            _ if self.case.geometry.change_coords_only => self.load_moved_geometry(path)?,
            _ => LoadedGeometry::read(path)?,
        };

        Ok(self.geometry.insert(loaded))
    }

    /// element blocks of the connectivity step placed on the nodes stored at `path`
    fn load_moved_geometry(&mut self, path: PathBuf) -> Result<LoadedGeometry, Error> {
        let connectivity_path = self.connectivity_path();

        let base = match self.connectivity.take() {
            Some(base) if base.path == connectivity_path => base,
            _ => LoadedGeometry::read(connectivity_path)?,
        };

        let geometry = if path == base.path {
            base.geometry.clone()
        } else {
            let moved = LoadedGeometry::read(path.clone())?;
            parse::apply_coordinates(&base.geometry, &moved.geometry)
                .map_err(|e| Error::read(&path, e))?
        };

        tracing::trace!(path = %path.display(), connectivity = %base.path.display(), "moved geometry");

        let loaded = LoadedGeometry {
            path,
            geometry,
            // variable files share the byte order of the connectivity step
            endian: base.endian,
        };
        self.connectivity = Some(base);

        Ok(loaded)
    }
}

impl Backend for EnsightReader {
    fn open(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::invalid_case(path, e))?;
        let case = parse::parse_case(&text).map_err(|e| Error::invalid_case(path, e))?;

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let time = case
            .time_sets
            .first()
            .and_then(TimeSet::first)
            .unwrap_or_default();

        let reader = Self {
            path: path.to_path_buf(),
            dir,
            case,
            time,
            geometry: None,
            connectivity: None,
        };

        let geometry_path = reader.geometry_path();
        let file = File::open(&geometry_path).map_err(|e| Error::invalid_case(path, e))?;
        parse::check_header(BufReader::new(file)).map_err(|e| Error::invalid_case(path, e))?;

        tracing::debug!(
            path = %path.display(),
            time_sets = reader.case.time_sets.len(),
            variables = reader.case.variables.len(),
            "opened case"
        );

        Ok(reader)
    }

    fn time_sets(&self) -> &[TimeSet] {
        &self.case.time_sets
    }

    fn primary_part(&mut self) -> Result<&Part, Error> {
        let loaded = self.load_geometry()?;
        loaded
            .geometry
            .primary_part()
            .ok_or_else(|| Error::read(&loaded.path, MissingEntry::new("geometry", "part")))
    }

    fn update_time(&mut self, time: f64) -> Result<(), Error> {
        tracing::debug!(from = self.time, to = time, "seeking");
        self.time = time;
        self.load_geometry()?;
        Ok(())
    }

    fn cell_array(&mut self, name: &str) -> Result<Option<CellArray>, Error> {
        let variable = match self.case.variable(name) {
            Some(variable) if variable.is_per_element() => variable,
            _ => return Ok(None),
        };

        let filename = match &variable.source {
            VariableSource::File(filename) => filename,
            VariableSource::Constants(_) => return Ok(None),
        };

        let components = variable.shape.components();
        let path = self.resolve(filename, variable.time_set);

        let loaded = self.load_geometry()?;
        let part = loaded
            .geometry
            .primary_part()
            .ok_or_else(|| Error::read(&loaded.path, MissingEntry::new("geometry", "part")))?;

        tracing::trace!(variable = name, path = %path.display(), part = part.number, "reading cell array");

        let file = File::open(&path).map_err(|e| Error::read(&path, e))?;
        let array = parse::read_element_variable(
            BufReader::new(file),
            loaded.endian,
            &loaded.geometry,
            part.number,
            components,
        )
        .map_err(|e| Error::read(&path, e))?;

        if array.is_none() {
            tracing::warn!(variable = name, part = part.number, "variable has no values for the primary part");
        }

        Ok(array)
    }

    fn cell_array_names(&self) -> Vec<String> {
        self.case
            .variables
            .iter()
            .filter(|variable| variable.is_per_element())
            .map(|variable| variable.description.clone())
            .collect()
    }
}
