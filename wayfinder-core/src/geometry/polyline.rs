//! Encoded polyline codec.
//!
//! Values are zig-zag encoded deltas of `round(value * 10^precision)`, split
//! into 5-bit chunks offset by 63. Latitude precedes longitude in each pair.

use geo::{Coord, LineString};

use super::GeometryError;

/// Precision used by Mapbox Directions and OSRM `polyline6` geometries.
pub const POLYLINE_PRECISION: u8 = 6;

/// Precision used by the classic Google polyline format.
pub const GOOGLE_POLYLINE_PRECISION: u8 = 5;

const CHUNK_OFFSET: u8 = 63;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;

/// Decode `encoded` into coordinates where `x` is longitude and `y` latitude.
///
/// An empty string decodes to an empty line.
///
/// # Errors
///
/// Returns [`GeometryError::Malformed`] when a character falls outside the
/// polyline alphabet, a value is truncated, a latitude has no matching
/// longitude, or the running sum of deltas overflows.
///
/// # Examples
///
/// ```
/// use wayfinder_core::geometry::decode_polyline;
///
/// let line = decode_polyline("_p~iF~ps|U_ulLnnqC", 5)?;
/// assert_eq!(line.0.len(), 2);
/// assert!((line.0[0].y - 38.5).abs() < 1e-9);
/// assert!((line.0[0].x + 120.2).abs() < 1e-9);
/// # Ok::<(), wayfinder_core::geometry::GeometryError>(())
/// ```
pub fn decode_polyline(encoded: &str, precision: u8) -> Result<LineString<f64>, GeometryError> {
    let factor = 10_f64.powi(i32::from(precision));
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();
    let mut index = 0;
    let (mut lat, mut lon) = (0_i64, 0_i64);

    while index < bytes.len() {
        let (dlat, next) = decode_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(GeometryError::Malformed {
                position: next,
                reason: "latitude without longitude",
            });
        }
        let (dlon, after) = decode_value(bytes, next)?;
        let (Some(next_lat), Some(next_lon)) = (lat.checked_add(dlat), lon.checked_add(dlon))
        else {
            return Err(GeometryError::Malformed {
                position: after,
                reason: "coordinate overflows 64 bits",
            });
        };
        lat = next_lat;
        lon = next_lon;
        index = after;
        coords.push(Coord {
            x: lon as f64 / factor,
            y: lat as f64 / factor,
        });
    }

    Ok(LineString::new(coords))
}

/// Encode `line` using `precision` decimal places.
///
/// # Examples
///
/// ```
/// use geo::{Coord, LineString};
/// use wayfinder_core::geometry::encode_polyline;
///
/// let line = LineString::new(vec![
///     Coord { x: -120.2, y: 38.5 },
///     Coord { x: -120.95, y: 40.7 },
/// ]);
/// assert_eq!(encode_polyline(&line, 5), "_p~iF~ps|U_ulLnnqC");
/// ```
#[must_use]
pub fn encode_polyline(line: &LineString<f64>, precision: u8) -> String {
    let factor = 10_f64.powi(i32::from(precision));
    let mut out = String::new();
    let (mut prev_lat, mut prev_lon) = (0_i64, 0_i64);
    for coord in line.coords() {
        let lat = (coord.y * factor).round() as i64;
        let lon = (coord.x * factor).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }
    out
}

fn decode_value(bytes: &[u8], start: usize) -> Result<(i64, usize), GeometryError> {
    let mut result = 0_i64;
    let mut shift = 0_u32;
    let mut index = start;
    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(GeometryError::Malformed {
                position: index,
                reason: "truncated value",
            });
        };
        if !(CHUNK_OFFSET..=126).contains(&byte) {
            return Err(GeometryError::Malformed {
                position: index,
                reason: "character outside the polyline alphabet",
            });
        }
        if shift > 60 {
            return Err(GeometryError::Malformed {
                position: index,
                reason: "value overflows 64 bits",
            });
        }
        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        index += 1;
        if chunk < CONTINUATION {
            break;
        }
    }
    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, index))
}

fn encode_value(value: i64, out: &mut String) {
    let mut remaining = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    };
    while remaining >= CONTINUATION {
        out.push(chunk_char((remaining & CHUNK_MASK) | CONTINUATION));
        remaining >>= 5;
    }
    out.push(chunk_char(remaining));
}

fn chunk_char(chunk: i64) -> char {
    // Chunks are at most six bits wide, so the sum stays within ASCII.
    char::from(chunk as u8 + CHUNK_OFFSET)
}
