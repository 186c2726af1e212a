//! Derived-field utilities
//!
//! Small numeric conversions shared by the codec and the trimming engine:
//! the base-36 counter codec, wind vector components and the projection of
//! a coordinate along a bearing.

use crate::constants::{BASE36_ALPHABET, EARTH_RADIUS_KM, VARIABLE_WIND_DIRECTION};
use crate::error::{Error, Result};
use crate::models::round_half_away;

/// Encode a non-negative integer with the `0-9A-Z` alphabet
pub fn base36_encode(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BASE36_ALPHABET[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// Value of a single base-36 digit; lower-case letters are accepted
pub fn base36_digit(c: char) -> Option<u64> {
    c.to_digit(36).map(u64::from)
}

pub fn base36_decode(s: &str) -> Result<u64> {
    if s.is_empty() {
        return Err(Error::malformed_record("empty base-36 string"));
    }
    s.chars().try_fold(0u64, |acc, c| {
        let digit = base36_digit(c).ok_or_else(|| {
            Error::malformed_record(format!("invalid base-36 digit '{}' in '{}'", c, s))
        })?;
        acc.checked_mul(36)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::malformed_record(format!("base-36 value '{}' overflows", s)))
    })
}

/// Eastward and northward wind components.
///
/// Direction is in whole degrees clockwise from north, the direction the
/// wind blows from. Calm or variable winds (`0`, `361`, or zero speed) give
/// `(0, 0)`. Directions outside `1..=360` give `None`.
pub fn wind_components(speed: f64, direction: i64) -> Option<(f64, f64)> {
    if direction == 0 || direction == VARIABLE_WIND_DIRECTION || speed == 0.0 {
        return Some((0.0, 0.0));
    }
    if !(1..=360).contains(&direction) {
        return None;
    }
    let towards = ((direction + 180) as f64).to_radians();
    Some((speed * towards.sin(), speed * towards.cos()))
}

/// Project a point `distance_km` along `bearing` (hundredths of a degree).
///
/// Input and output coordinates are hundredths of a degree; the result is
/// rounded half away from zero. Longitude is not wrapped, so a projection
/// across the dateline can leave `-18000..18000`.
pub fn offset_from_bearing(lat: i64, lon: i64, distance_km: f64, bearing: i64) -> (i64, i64) {
    let lat1 = (lat as f64 / 100.0).to_radians();
    let lon1 = (lon as f64 / 100.0).to_radians();
    let theta = (bearing as f64 / 100.0).to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    (
        round_half_away(lat2.to_degrees() * 100.0),
        round_half_away(lon2.to_degrees() * 100.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_known_values() {
        assert_eq!(base36_encode(0), "0");
        assert_eq!(base36_encode(35), "Z");
        assert_eq!(base36_encode(36), "10");
        assert_eq!(base36_decode("ZZ").unwrap(), 1295);
        assert_eq!(base36_decode("a").unwrap(), 10);
    }

    #[test]
    fn test_base36_round_trip() {
        for n in 0..=10_000_000u64 {
            assert_eq!(base36_decode(&base36_encode(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_base36_rejects_invalid_digits() {
        assert!(base36_decode("").is_err());
        assert!(base36_decode("1-2").is_err());
        assert!(base36_decode(" ").is_err());
    }

    #[test]
    fn test_variable_wind_is_calm() {
        assert_eq!(wind_components(12.5, 361), Some((0.0, 0.0)));
        assert_eq!(wind_components(12.5, 0), Some((0.0, 0.0)));
        assert_eq!(wind_components(0.0, 90), Some((0.0, 0.0)));
        assert_eq!(wind_components(5.0, 400), None);
    }

    #[test]
    fn test_wind_from_north_blows_south() {
        let (u, v) = wind_components(10.0, 360).unwrap();
        assert!(u.abs() < 1e-9);
        assert!((v + 10.0).abs() < 1e-9);

        let (u, v) = wind_components(10.0, 270).unwrap();
        assert!((u - 10.0).abs() < 1e-9);
        assert!(v.abs() < 1e-9);
    }

    #[test]
    fn test_offset_due_north() {
        // 111.19 km is one degree of latitude on the mean sphere
        let (lat, lon) = offset_from_bearing(0, 0, 111.19, 0);
        assert_eq!(lat, 100);
        assert_eq!(lon, 0);
    }

    #[test]
    fn test_offset_due_east_on_equator() {
        let (lat, lon) = offset_from_bearing(0, 0, 111.19, 9000);
        assert_eq!(lat, 0);
        assert_eq!(lon, 100);
    }

    #[test]
    fn test_offset_across_dateline_is_not_wrapped() {
        let (_, lon) = offset_from_bearing(0, 17950, 111.19, 9000);
        assert_eq!(lon, 18050);
    }
}
