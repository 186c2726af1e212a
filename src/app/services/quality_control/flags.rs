//! Trimming flag vector decoding
//!
//! Unpacks the base-36 trimming flags (`trms`), the base-36 composite QC
//! flags (`nqcs`), the bit-packed element and source-exclusion flags (`qce`,
//! `qcz`), the duplicate count and the location quality code of a record
//! into 23 integer slots.

use super::grid::grid_quality;
use crate::constants::quality::{FLAG_VECTOR_LEN, NCDC_QC_FLAG_COUNT, TRIM_FLAG_COUNT};
use crate::derived::base36_digit;
use crate::models::CompositeRecord;
use crate::schema::SectionKind;

/// Slot positions within a [`FlagVector`]
pub mod slot {
    /// Location quality code; 0 means the trimming flags are missing
    pub const B2: usize = 0;
    /// Number of duplicates
    pub const ND: usize = 1;
    /// Trimming flags
    pub const SF: usize = 2;
    pub const AF: usize = 3;
    pub const UF: usize = 4;
    pub const VF: usize = 5;
    pub const PF: usize = 6;
    pub const RF: usize = 7;
    /// Composite QC flags
    pub const ZQ: usize = 8;
    pub const SQ: usize = 9;
    pub const AQ: usize = 10;
    pub const WQ: usize = 11;
    pub const PQ: usize = 12;
    pub const RQ: usize = 13;
    /// Graduated flags
    pub const XQ: usize = 14;
    pub const CQ: usize = 15;
    pub const EQ: usize = 16;
    /// Location exclusion
    pub const LZ: usize = 17;
    /// Source exclusion flags
    pub const SZ: usize = 18;
    pub const AZ: usize = 19;
    pub const WZ: usize = 20;
    pub const PZ: usize = 21;
    pub const RZ: usize = 22;
}

// Character positions within the packed composite QC string
const ZNC: usize = 0;
const WNC: usize = 1;
const XNC: usize = 3;
const PNC: usize = 5;
const ANC: usize = 6;
const GNC: usize = 7;
const DNC: usize = 8;
const SNC: usize = 9;
const CNC: usize = 10;
const ENC: usize = 11;

/// Normalized trimming and QC flags of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagVector {
    slots: [i64; FLAG_VECTOR_LEN],
}

impl Default for FlagVector {
    fn default() -> Self {
        Self {
            slots: [0; FLAG_VECTOR_LEN],
        }
    }
}

impl FlagVector {
    pub fn from_slots(slots: [i64; FLAG_VECTOR_LEN]) -> Self {
        Self { slots }
    }

    pub fn get(&self, slot: usize) -> i64 {
        self.slots[slot]
    }

    pub fn set(&mut self, slot: usize, value: i64) {
        self.slots[slot] = value;
    }

    pub fn as_slots(&self) -> &[i64; FLAG_VECTOR_LEN] {
        &self.slots
    }

    /// No location quality code could be derived
    pub fn is_missing(&self) -> bool {
        self.slots[slot::B2] == 0
    }
}

/// Base-36 digits of a packed flag string; blanks and short strings leave `None`
fn unpack<const N: usize>(packed: Option<&str>) -> [Option<i64>; N] {
    let mut digits = [None; N];
    if let Some(text) = packed {
        for (digit, c) in digits.iter_mut().zip(text.chars()) {
            if c != ' ' {
                *digit = base36_digit(c).map(|d| d as i64);
            }
        }
    }
    digits
}

/// 1 when a QC code reaches `floor` without being the "not checked" code 10
fn at_least(code: i64, floor: i64) -> i64 {
    i64::from(code >= floor && code != 10)
}

/// Three-level grade of a QC code
fn graded(code: i64) -> i64 {
    match code {
        10 => 0,
        c if c >= 7 => 3,
        c if c >= 4 => 2,
        c if c >= 2 => 1,
        _ => 0,
    }
}

/// Add 2 to each slot from `last` down to `first` for every set bit, LSB first
fn spread_bits(flags: &mut FlagVector, packed: i64, last: usize, first: usize) {
    let mut bits = packed;
    for index in (first..=last).rev() {
        flags.slots[index] += 2 * (bits % 2);
        bits >>= 1;
    }
}

/// Decode the flag vector of a record
pub fn decode_flags(record: &CompositeRecord) -> FlagVector {
    let icoads = SectionKind::Icoads;
    let int = |kind: SectionKind, name: &str| record.value(kind, name).as_i64();

    let qc = unpack::<NCDC_QC_FLAG_COUNT>(record.value(icoads, "nqcs").as_text());
    let trims = unpack::<TRIM_FLAG_COUNT>(record.value(icoads, "trms").as_text());
    let code = |index: usize| qc[index].unwrap_or(0);

    let mut flags = FlagVector::default();

    let lat = record.value(SectionKind::CoreLocation, "lat").scaled_integer(100);
    let lon = record.value(SectionKind::CoreLocation, "lon").scaled_integer(100);
    if let (Some(lat), Some(lon), Some(b10)) = (lat, lon, int(icoads, "b10")) {
        flags.slots[slot::B2] = grid_quality(b10, lon, lat);
    }
    if let Some(nd) = int(icoads, "nd") {
        flags.slots[slot::ND] = nd;
    }

    if trims[0].is_some() {
        for (offset, trim) in trims.iter().enumerate() {
            flags.slots[slot::SF + offset] = trim.unwrap_or(0);
        }
    }

    if code(ZNC) != 0 {
        flags.slots[slot::ZQ] = at_least(code(ZNC), 7);
        flags.slots[slot::SQ] = at_least(code(SNC), 8);
        flags.slots[slot::AQ] = at_least(code(ANC), 8);

        // Calm reported with a direction
        let d = int(SectionKind::CoreRegular, "d");
        let w = record.value(SectionKind::CoreRegular, "w").scaled_integer(10);
        if let (Some(d), Some(0)) = (d, w) {
            if (1..=360).contains(&d) && code(WNC) == 7 {
                flags.slots[slot::WQ] = 1;
            }
        }

        flags.slots[slot::PQ] = at_least(code(PNC), 8);
        flags.slots[slot::RQ] = at_least(code(GNC), 8).max(at_least(code(DNC), 8));
        flags.slots[slot::XQ] = graded(code(XNC));
        flags.slots[slot::CQ] = graded(code(CNC));
        flags.slots[slot::EQ] = graded(code(ENC));
    }

    if let Some(qce) = int(icoads, "qce").filter(|&q| q != 0) {
        spread_bits(&mut flags, qce, slot::RQ, slot::ZQ);
    }
    if let Some(lz) = int(icoads, "lz") {
        flags.slots[slot::LZ] = lz;
    }
    if let Some(qcz) = int(icoads, "qcz").filter(|&q| q != 0) {
        spread_bits(&mut flags, qcz, slot::RZ, slot::SZ);
    }

    flags
}
