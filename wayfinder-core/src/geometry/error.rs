use std::fmt;

use thiserror::Error;

/// Which level of the route hierarchy an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Index into [`crate::Route::legs`].
    Leg,
    /// Index into [`crate::Leg::steps`].
    Step,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Leg => "leg",
            Self::Step => "step",
        })
    }
}

/// Errors raised by the geometry kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// An encoded polyline could not be decoded.
    #[error("malformed polyline at byte {position}: {reason}")]
    Malformed {
        /// Byte offset at which decoding failed.
        position: usize,
        /// Short description of the fault.
        reason: &'static str,
    },
    /// An operation needed at least one coordinate.
    #[error("geometry contains no coordinates")]
    EmptyGeometry,
    /// A leg or step index did not exist in the route.
    #[error("{kind} index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        /// Hierarchy level of the index.
        kind: IndexKind,
        /// Offending index.
        index: usize,
        /// Number of entries available.
        len: usize,
    },
}

/// A length unit name was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown length unit: {name}")]
pub struct UnknownLengthUnit {
    /// The rejected input.
    pub name: String,
}
