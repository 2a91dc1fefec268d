use std::result;

/// Error kinds surfaced by every engine operation. Callers decide
/// whether to retry, substitute defaults or abort; the engine itself
/// never terminates the process.
#[derive(Debug, Fail)]
pub enum Error {
    /// Sample or dimension counts outside the compiled limits of a
    /// sequence family.
    #[fail(display = "invalid dimensions: {}", _0)]
    InvalidDimensions(String),
    /// Unknown sequence family name.
    #[fail(display = "unsupported sequence family: {:?}", _0)]
    UnsupportedFamily(String),
    /// Caller-provided buffer inconsistent with the declared shape.
    #[fail(display = "buffer size mismatch: expected {} elements, got {}", expected, actual)]
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Opaque internal failure, e.g. a worker thread panicking mid-run.
    /// The current trial is abandoned; no partial grids are returned.
    #[fail(display = "native engine failure: {}", _0)]
    NativeFailure(String),
}

pub type Result<T> = result::Result<T, Error>;
