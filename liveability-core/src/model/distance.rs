//! helpers for moving [`Length`] values in and out of storage, which records
//! network distances as plain meters.
use uom::si::{f64::Length, length::meter};

pub fn from_meters(meters: f64) -> Length {
    Length::new::<meter>(meters)
}

pub fn to_meters(length: &Length) -> f64 {
    length.get::<meter>()
}

/// the shorter of two optional distances. a missing value never wins over
/// a present one.
pub fn min_distance(a: Option<Length>, b: Option<Length>) -> Option<Length> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => {
            if b < a {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}
