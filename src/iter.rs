use crate::prelude::*;

/// Iterator over the times of a session's time set and the field sample read at each
///
/// Created by [`CaseSession::timesteps`]. A failed read is yielded as an `Err` for that
/// time and iteration continues with the next one.
pub struct Timesteps<'a, B: Backend> {
    idx: usize,
    times: Vec<f64>,
    session: &'a mut CaseSession<B>,
}

impl<'a, B: Backend> Timesteps<'a, B> {
    pub(crate) fn new(session: &'a mut CaseSession<B>, times: Vec<f64>) -> Self {
        Self {
            idx: 0,
            times,
            session,
        }
    }
}

impl<'a, B: Backend> Iterator for Timesteps<'a, B> {
    type Item = (f64, Result<FieldSample, Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let time = *self.times.get(self.idx)?;
        self.idx += 1;
        Some((time, self.session.read_timestep(time)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.times.len() - self.idx;
        (remaining, Some(remaining))
    }
}

impl<'a, B: Backend> ExactSizeIterator for Timesteps<'a, B> {}
