//! Geometry kernel: polyline codec, great-circle measures and projection.
//!
//! Coordinates follow the `geo` convention of `x = longitude` and
//! `y = latitude`, in degrees. Lengths are metres unless a [`LengthUnit`] is
//! supplied.

mod error;
mod measure;
mod polyline;

pub use error::{GeometryError, IndexKind, UnknownLengthUnit};
pub use measure::{
    LengthUnit, Projection, along, angle_difference, bearing, destination, distance, line_slice,
    path_length, project_onto_line, wrap,
};
pub use polyline::{GOOGLE_POLYLINE_PRECISION, POLYLINE_PRECISION, decode_polyline, encode_polyline};
