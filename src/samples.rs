/// Append-only list of nanosecond offsets backing the plot.
///
/// Nothing is ever evicted, so memory grows with the session length.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    values: Vec<i64>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: i64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<i64> {
        self.values.last().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    /// `[index, value]` pairs, ready for `egui_plot::PlotPoints`.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v as f64])
    }
}
