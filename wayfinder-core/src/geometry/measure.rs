//! Distances, bearings and line operations on WGS84 coordinates.
//!
//! Distances are great-circle metres from [`geo::Haversine`]. Projection onto
//! segments is done in a local equirectangular frame scaled by the cosine of
//! the latitude, which is accurate at street scale.

use std::fmt;
use std::str::FromStr;

use geo::{Bearing, Coord, Destination, Distance, Haversine, LineString, Point};

use super::{GeometryError, UnknownLengthUnit};

/// Unit for reported lengths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Metres.
    #[default]
    Meters,
    /// Kilometres.
    Kilometers,
    /// International miles.
    Miles,
    /// International feet.
    Feet,
}

impl LengthUnit {
    /// Convert a length in metres into this unit.
    #[must_use]
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Self::Meters => meters,
            Self::Kilometers => meters / 1_000.0,
            Self::Miles => meters / 1_609.344,
            Self::Feet => meters / 0.3048,
        }
    }

    /// Return the canonical short name for this unit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Miles => "mi",
            Self::Feet => "ft",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = UnknownLengthUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "meters" | "metres" => Ok(Self::Meters),
            "km" | "kilometers" | "kilometres" => Ok(Self::Kilometers),
            "mi" | "miles" => Ok(Self::Miles),
            "ft" | "feet" => Ok(Self::Feet),
            _ => Err(UnknownLengthUnit { name: s.to_owned() }),
        }
    }
}

/// Closest point on a line to some query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point on the line.
    pub point: Point<f64>,
    /// Index of the segment containing [`Projection::point`].
    pub segment_index: usize,
    /// Metres along the line from its first coordinate.
    pub distance_along: f64,
    /// Metres between the query point and [`Projection::point`].
    pub distance_from_line: f64,
}

/// Great-circle distance in metres.
#[must_use]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b)
}

/// Initial bearing from `a` to `b` in degrees within `[0, 360)`.
#[must_use]
pub fn bearing(a: Point<f64>, b: Point<f64>) -> f64 {
    wrap(Haversine.bearing(a, b), 0.0, 360.0)
}

/// Point reached by travelling `meters` from `origin` along `bearing`.
#[must_use]
pub fn destination(origin: Point<f64>, bearing: f64, meters: f64) -> Point<f64> {
    Haversine.destination(origin, bearing, meters)
}

/// Wrap `value` into the half-open interval `[min, max)`.
///
/// ```
/// use wayfinder_core::geometry::wrap;
///
/// assert_eq!(wrap(370.0, 0.0, 360.0), 10.0);
/// assert_eq!(wrap(190.0, -180.0, 180.0), -170.0);
/// ```
#[must_use]
pub fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    ((value - min) % span + span) % span + min
}

/// Smallest absolute difference between two headings, in `[0, 180]`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Total length of `line` expressed in `unit`.
#[must_use]
pub fn path_length(line: &LineString<f64>, unit: LengthUnit) -> f64 {
    let meters: f64 = line
        .lines()
        .map(|segment| distance(segment.start.into(), segment.end.into()))
        .sum();
    unit.from_meters(meters)
}

/// Point `meters` along `line` from its start.
///
/// Distances at or below zero yield the first coordinate and distances beyond
/// the end yield the last.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyGeometry`] when `line` has no coordinates.
pub fn along(line: &LineString<f64>, meters: f64) -> Result<Point<f64>, GeometryError> {
    let first = line.0.first().ok_or(GeometryError::EmptyGeometry)?;
    if meters <= 0.0 {
        return Ok(Point::from(*first));
    }
    let mut travelled = 0.0;
    for segment in line.lines() {
        let start = Point::from(segment.start);
        let end = Point::from(segment.end);
        let length = distance(start, end);
        if travelled + length >= meters {
            let overshoot = meters - travelled;
            if overshoot <= 0.0 {
                return Ok(start);
            }
            return Ok(destination(start, bearing(start, end), overshoot));
        }
        travelled += length;
    }
    line.0
        .last()
        .copied()
        .map(Point::from)
        .ok_or(GeometryError::EmptyGeometry)
}

/// Project `point` onto the nearest position of `line`.
///
/// A single-coordinate line projects everything onto that coordinate. Ties
/// resolve to the earliest segment.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyGeometry`] when `line` has no coordinates.
pub fn project_onto_line(
    point: Point<f64>,
    line: &LineString<f64>,
) -> Result<Projection, GeometryError> {
    let first = line.0.first().ok_or(GeometryError::EmptyGeometry)?;
    if line.0.len() == 1 {
        let vertex = Point::from(*first);
        return Ok(Projection {
            point: vertex,
            segment_index: 0,
            distance_along: 0.0,
            distance_from_line: distance(point, vertex),
        });
    }

    let mut best: Option<Projection> = None;
    let mut cumulative = 0.0;
    for (segment_index, segment) in line.lines().enumerate() {
        let start = Point::from(segment.start);
        let end = Point::from(segment.end);
        let projected = project_onto_segment(point, start, end);
        let offset = distance(point, projected);
        if best.is_none_or(|current| offset < current.distance_from_line) {
            best = Some(Projection {
                point: projected,
                segment_index,
                distance_along: cumulative + distance(start, projected),
                distance_from_line: offset,
            });
        }
        cumulative += distance(start, end);
    }
    best.ok_or(GeometryError::EmptyGeometry)
}

/// Sub-line of `line` between the projections of `from` and `to`.
///
/// The result keeps the direction of `line`, so swapping `from` and `to`
/// yields the same coordinates.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyGeometry`] when `line` has no coordinates.
pub fn line_slice(
    from: Point<f64>,
    to: Point<f64>,
    line: &LineString<f64>,
) -> Result<LineString<f64>, GeometryError> {
    let start = project_onto_line(from, line)?;
    let stop = project_onto_line(to, line)?;
    let (first, last) = if start.distance_along <= stop.distance_along {
        (start, stop)
    } else {
        (stop, start)
    };

    let inner = line
        .0
        .get(first.segment_index + 1..=last.segment_index)
        .unwrap_or(&[]);
    let mut coords = Vec::with_capacity(inner.len() + 2);
    coords.push(first.point.0);
    coords.extend_from_slice(inner);
    coords.push(last.point.0);
    Ok(LineString::new(coords))
}

fn project_onto_segment(point: Point<f64>, start: Point<f64>, end: Point<f64>) -> Point<f64> {
    let scale = start.y().to_radians().cos();
    let to_local = |c: Coord<f64>| Coord {
        x: (c.x - start.x()) * scale,
        y: c.y - start.y(),
    };
    let p = to_local(point.0);
    let d = to_local(end.0);
    let length_sq = d.x * d.x + d.y * d.y;
    if length_sq <= 0.0 {
        return start;
    }
    let t = (p.x * d.x + p.y * d.y) / length_sq;
    if t <= 0.0 {
        start
    } else if t >= 1.0 {
        end
    } else {
        Point::new(
            start.x() + (end.x() - start.x()) * t,
            start.y() + (end.y() - start.y()) * t,
        )
    }
}
