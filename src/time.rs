//! Time sets declared in the `TIME` section of a case file

/// An ordered collection of simulation times at which data was written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSet {
    /// the number following `time set:` in the case file
    pub id: u32,
    pub description: Option<String>,
    values: Vec<f64>,
    filename_numbers: Vec<u32>,
}

impl TimeSet {
    /// Construct a time set whose file numbers count up from zero
    pub fn new(id: u32, values: Vec<f64>) -> Self {
        let filename_numbers = (0..values.len() as u32).collect();
        Self {
            id,
            description: None,
            values,
            filename_numbers,
        }
    }

    /// Construct a time set with explicit file numbers.
    ///
    /// Returns `None` if the two lists differ in length.
    pub fn with_filename_numbers(id: u32, values: Vec<f64>, numbers: Vec<u32>) -> Option<Self> {
        if values.len() != numbers.len() {
            return None;
        }

        Some(Self {
            id,
            description: None,
            values,
            filename_numbers: numbers,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// number of timesteps
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn filename_numbers(&self) -> &[u32] {
        &self.filename_numbers
    }

    /// file number substituted into wildcard filenames for step `step`
    pub fn filename_number(&self, step: usize) -> Option<u32> {
        self.filename_numbers.get(step).copied()
    }

    /// Index of the step that is active at `time`: the last step whose value is not
    /// after `time`, or the first step if `time` comes before all of them.
    ///
    /// Returns `None` only for an empty time set.
    pub fn step_at(&self, time: f64) -> Option<usize> {
        if self.values.is_empty() {
            return None;
        }

        let tolerance = 1e-9 * time.abs().max(1.0);
        let step = self
            .values
            .iter()
            .rposition(|value| *value <= time + tolerance)
            .unwrap_or(0);

        Some(step)
    }
}

impl<'a> IntoIterator for &'a TimeSet {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_lookup() {
        let ts = TimeSet::new(1, vec![0.0, 0.5, 1.0, 2.0]);

        assert_eq!(ts.step_at(0.0), Some(0));
        assert_eq!(ts.step_at(0.75), Some(1));
        assert_eq!(ts.step_at(1.0), Some(2));
        assert_eq!(ts.step_at(100.0), Some(3));
        assert_eq!(ts.step_at(-1.0), Some(0));
    }

    #[test]
    fn step_lookup_tolerates_rounding() {
        let ts = TimeSet::new(1, vec![0.1, 0.2, 0.3]);
        // 0.1 + 0.2 is slightly more than 0.3 and 0.3 parsed from text may be slightly less
        assert_eq!(ts.step_at(0.30000000000000004), Some(2));
        assert_eq!(ts.step_at(0.29999999999), Some(2));
    }

    #[test]
    fn empty_time_set() {
        let ts = TimeSet::new(1, vec![]);
        assert!(ts.is_empty());
        assert_eq!(ts.step_at(0.0), None);
    }

    #[test]
    fn explicit_filename_numbers() {
        assert!(TimeSet::with_filename_numbers(2, vec![0.0, 1.0], vec![5]).is_none());

        let ts = TimeSet::with_filename_numbers(2, vec![0.0, 1.0], vec![5, 10]).unwrap();
        assert_eq!(ts.filename_number(1), Some(10));
        assert_eq!(ts.filename_number(2), None);
    }
}
