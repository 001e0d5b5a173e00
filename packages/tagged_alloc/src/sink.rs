//! Destinations for diagnostic text.

/// Receives the diagnostic lines produced by a [`Tracker`](crate::Tracker).
///
/// Each call delivers one complete line without a trailing newline.
pub trait DiagnosticSink {
    /// Accepts one line of diagnostic text.
    fn emit(&mut self, line: &str);
}

/// Writes each diagnostic line to the standard output stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects the lines in memory, in the order they were emitted.
impl DiagnosticSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, line: &str) {
        (**self).emit(line);
    }
}
