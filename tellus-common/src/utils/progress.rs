/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 02/04/2024
Last Modified: 02/04/2024
License: MIT
*/

/// Callback interface through which long-running whole-file operations
/// report their progress. Callers are only notified when the integer
/// percentage changes, so implementations may update a UI directly.
pub trait ProgressHandler {
    fn progress(&mut self, key: &str, percent: usize, message: &str);
}

/// A `ProgressHandler` that discards all updates.
pub struct SilentProgress;

impl ProgressHandler for SilentProgress {
    fn progress(&mut self, _key: &str, _percent: usize, _message: &str) {}
}

#[cfg(test)]
mod test {
    use super::{ProgressHandler, SilentProgress};

    struct Recorder {
        calls: Vec<usize>,
    }

    impl ProgressHandler for Recorder {
        fn progress(&mut self, _key: &str, percent: usize, _message: &str) {
            self.calls.push(percent);
        }
    }

    #[test]
    fn test_handlers() {
        let mut silent = SilentProgress;
        silent.progress("read", 50, "halfway");

        let mut rec = Recorder { calls: vec![] };
        rec.progress("read", 10, "");
        rec.progress("read", 20, "");
        assert_eq!(rec.calls, vec![10, 20]);
    }
}
