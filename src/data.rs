use crate::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
/// Everything extracted from a case in one go
///
/// `values` has shape `(timesteps, cells)`: row `i` is the field sample at `times[i]`, and
/// its columns follow the cell order of `mesh`.
pub struct CaseData {
    pub mesh: MeshSnapshot,
    pub times: Vec<f64>,
    pub values: Array2<f64>,
}

impl CaseData {
    pub fn new(mesh: MeshSnapshot, times: Vec<f64>, values: Array2<f64>) -> Self {
        CaseData {
            mesh,
            times,
            values,
        }
    }

    pub fn num_steps(&self) -> usize {
        self.times.len()
    }

    /// the field sample of timestep `step`
    pub fn sample(&self, step: usize) -> Option<FieldSample> {
        (step < self.values.nrows()).then(|| FieldSample::new(self.values.row(step).to_owned()))
    }

    /// Write the mesh and every sample as a new Ensight Gold case.
    ///
    /// See [`write_triangles`](crate::write_triangles) for the files created.
    pub fn write(&self, dir: &Path, basename: &str, field: &str) -> Result<PathBuf, Error> {
        let samples: Vec<FieldSample> = (0..self.num_steps())
            .filter_map(|step| self.sample(step))
            .collect();
        crate::write_triangles(dir, basename, &self.mesh, field, &self.times, &samples)
    }
}
