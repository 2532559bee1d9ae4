//! Advisory progress reporting
//!
//! Long batch operations report progress through this observer. It is purely
//! advisory: engine correctness never depends on an observer being present,
//! and the default [`NoProgress`] discards everything.

/// Observer for long-running batch operations
pub trait ProgressObserver {
    /// Announces `n` more units of upcoming work
    fn extend(&mut self, _n: usize) {}

    /// Marks one unit of work done
    fn step(&mut self) {}

    /// Marks the whole operation finished
    fn finish(&mut self) {}
}

/// Observer that ignores all notifications
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Observer that counts notifications; handy for tests and simple displays
#[derive(Debug, Default)]
pub struct CountingProgress {
    /// Total units announced via `extend`
    pub total: usize,
    /// Units completed via `step`
    pub steps: usize,
    /// Number of `finish` calls seen
    pub finished: usize,
}

impl ProgressObserver for CountingProgress {
    fn extend(&mut self, n: usize) {
        self.total += n;
    }

    fn step(&mut self) {
        self.steps += 1;
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}
