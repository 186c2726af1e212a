//! Location quality code from the ten-degree bearing box
//!
//! The box number (B10, 1..=648) selects a quadrant; the quadrant and the
//! report position in hundredths of a degree select a two-degree cell
//! number (B2). Cell arithmetic is the legacy integer arithmetic and must
//! not be simplified: archived trimming output depends on it.

use crate::constants::quality::{
    BEARING_BOX_COUNT, BEARING_BOXES_PER_BAND, NORTH_POLE_CODE, SOUTH_POLE_CODE,
};

/// Quadrant (1..=4) of a ten-degree box, -1 outside the box range
pub fn qb10(b10: i64) -> i64 {
    if !(1..=BEARING_BOX_COUNT).contains(&b10) {
        return -1;
    }
    2 + ((b10 - 1) / BEARING_BOXES_PER_BAND) * 2 - (((b10 - 1 + 3) % 36) / 18)
}

/// Two-degree cell number of a quadrant and position.
///
/// `x` is longitude in 0..=35999 and `y` latitude in -9000..=9000, both in
/// hundredths of a degree. Anything out of range yields 0, which callers
/// treat as "no trimming flags". Exact poles map to constant codes and
/// columns saturate at the grid edge.
pub fn b2qxy(q: i64, x: i64, y: i64) -> i64 {
    let yy = y.abs();
    if !(1..=4).contains(&q) || !(0..=35999).contains(&x) || yy > 9000 {
        return 0;
    }

    if yy == 9000 {
        return if y == 9000 { NORTH_POLE_CODE } else { SOUTH_POLE_CODE };
    }

    let column = if q % 2 == 0 {
        (x / 200).min(89)
    } else {
        179 - (((36000 - x) % 36000) / 200).min(89)
    };
    let row = if q / 3 == 0 {
        89 - (9000 + y) / 200
    } else {
        (9000 - y) / 200
    };

    2 + row * 180 + column
}

/// Location quality code of a report
pub fn grid_quality(b10: i64, lon: i64, lat: i64) -> i64 {
    b2qxy(qb10(b10), lon, lat)
}
