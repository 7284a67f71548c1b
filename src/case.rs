//! The contents of an Ensight Gold `.case` file
//!
//! A case file is a small text index that names the geometry file, the variable files, and
//! the time sets that drive wildcard filenames. [`CaseFile`] is produced by
//! [`parse::parse_case`](crate::parse::parse_case) and written by
//! [`write_ensight::write_case`](crate::write_ensight::write_case).

use crate::time::TimeSet;
use crate::utils;

/// The `model:` entry of the `GEOMETRY` section
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEntry {
    pub time_set: Option<u32>,
    /// path relative to the case file, possibly containing `*` wildcards
    pub filename: String,
    /// only the coordinates change between steps, the element blocks are read from the
    /// file of [`connectivity_step`](Self::connectivity_step)
    pub change_coords_only: bool,
    /// 0-based step whose file holds the element blocks, the first step if `None`
    pub connectivity_step: Option<usize>,
}

impl GeometryEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            time_set: None,
            filename: filename.into(),
            change_coords_only: false,
            connectivity_step: None,
        }
    }

    pub fn with_time_set(mut self, time_set: u32) -> Self {
        self.time_set = Some(time_set);
        self
    }
}

/// Number of components of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableShape {
    Scalar,
    Vector,
    TensorSymm,
    TensorAsym,
}

impl VariableShape {
    pub fn components(&self) -> usize {
        match self {
            VariableShape::Scalar => 1,
            VariableShape::Vector => 3,
            VariableShape::TensorSymm => 6,
            VariableShape::TensorAsym => 9,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            VariableShape::Scalar => "scalar",
            VariableShape::Vector => "vector",
            VariableShape::TensorSymm => "tensor symm",
            VariableShape::TensorAsym => "tensor asym",
        }
    }
}

/// What a variable is defined on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableLocation {
    Node,
    Element,
    MeasuredNode,
    /// a single value for the whole case, per time step
    Case,
}

impl VariableLocation {
    pub fn keyword(&self) -> &'static str {
        match self {
            VariableLocation::Node => "node",
            VariableLocation::Element => "element",
            VariableLocation::MeasuredNode => "measured node",
            VariableLocation::Case => "case",
        }
    }
}

/// Where the values of a variable come from
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSource {
    File(String),
    /// `constant per case` values given inline, one per time step
    Constants(Vec<f64>),
}

/// A single entry of the `VARIABLE` section
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub shape: VariableShape,
    pub location: VariableLocation,
    pub time_set: Option<u32>,
    /// the variable name, unique within a case
    pub description: String,
    pub source: VariableSource,
}

impl VariableEntry {
    /// A per-element variable stored in files matching `filename`
    pub fn per_element(
        shape: VariableShape,
        description: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            shape,
            location: VariableLocation::Element,
            time_set: None,
            description: description.into(),
            source: VariableSource::File(filename.into()),
        }
    }

    pub fn with_time_set(mut self, time_set: u32) -> Self {
        self.time_set = Some(time_set);
        self
    }

    pub fn filename(&self) -> Option<&str> {
        match &self.source {
            VariableSource::File(name) => Some(name),
            VariableSource::Constants(_) => None,
        }
    }

    pub fn is_per_element(&self) -> bool {
        self.location == VariableLocation::Element
    }
}

/// Everything declared in a `.case` file
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    pub geometry: GeometryEntry,
    pub variables: Vec<VariableEntry>,
    /// sorted by id
    pub time_sets: Vec<TimeSet>,
}

impl CaseFile {
    pub fn new(geometry: GeometryEntry) -> Self {
        Self {
            geometry,
            variables: Vec::new(),
            time_sets: Vec::new(),
        }
    }

    pub fn time_set(&self, id: u32) -> Option<&TimeSet> {
        self.time_sets.iter().find(|ts| ts.id == id)
    }

    pub fn variable(&self, description: &str) -> Option<&VariableEntry> {
        self.variables
            .iter()
            .find(|variable| variable.description == description)
    }

    /// Resolve a possibly wildcarded filename for the step of `time_set` that is
    /// active at `time`. Filenames without wildcards are returned unchanged.
    pub fn filename_at(&self, filename: &str, time_set: Option<u32>, time: f64) -> String {
        let step = time_set
            .and_then(|id| self.time_set(id))
            .and_then(|ts| ts.step_at(time));

        match step {
            Some(step) => self.filename_at_step(filename, time_set, step),
            None => filename.to_string(),
        }
    }

    /// Resolve a possibly wildcarded filename for step `step` of `time_set`.
    pub fn filename_at_step(&self, filename: &str, time_set: Option<u32>, step: usize) -> String {
        if !filename.contains('*') {
            return filename.to_string();
        }

        let number = time_set
            .and_then(|id| self.time_set(id))
            .and_then(|ts| ts.filename_number(step));

        match number {
            Some(number) => utils::expand_wildcards(filename, number),
            None => filename.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> CaseFile {
        let mut case = CaseFile::new(GeometryEntry::new("mesh.geo"));
        case.time_sets.push(
            TimeSet::with_filename_numbers(1, vec![0.0, 10.0, 20.0], vec![0, 5, 10]).unwrap(),
        );
        case.variables.push(
            VariableEntry::per_element(VariableShape::Scalar, "temperature", "temp.****")
                .with_time_set(1),
        );
        case
    }

    #[test]
    fn wildcard_resolution_follows_time() {
        let case = case();
        let variable = case.variable("temperature").unwrap();
        let filename = variable.filename().unwrap();

        assert_eq!(case.filename_at(filename, variable.time_set, 0.0), "temp.0000");
        assert_eq!(case.filename_at(filename, variable.time_set, 15.0), "temp.0005");
        assert_eq!(case.filename_at(filename, variable.time_set, 20.0), "temp.0010");
    }

    #[test]
    fn wildcard_resolution_by_step() {
        let case = case();
        assert_eq!(case.filename_at_step("temp.****", Some(1), 1), "temp.0005");
        // out of range steps leave the pattern alone
        assert_eq!(case.filename_at_step("temp.****", Some(1), 3), "temp.****");
    }

    #[test]
    fn static_filenames_are_unchanged() {
        let case = case();
        assert_eq!(case.filename_at("mesh.geo", None, 20.0), "mesh.geo");
    }
}
