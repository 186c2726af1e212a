//! Trimming decision rules
//!
//! [`trim_flags`] is the legacy rule table: a report-level hard reject
//! followed by five independent per-variable rejections. [`evaluate`] reads
//! a decoded record, runs the table and returns the observed values with
//! rejected variables set to missing.

use super::flags::{decode_flags, slot, FlagVector};
use super::options::TrimOptions;
use crate::constants::quality::{
    CALIBRATION_EXEMPT_FLAG, DUPLICATE_RULE_YEAR, LEGACY_DUPLICATE_STATUS, MODERN_ERA_YEAR,
};
use crate::error::{Error, Result};
use crate::models::{CompositeRecord, Value};
use crate::schema::SectionKind;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// OPPT value selecting the strict platform-type list
const STRICT_PLATFORM_TYPES: i64 = 0;

/// OPPT value of the second platform-type branch; equal to the first, see below
const UNCONFIRMED_PLATFORM_TYPES: i64 = 0;

/// Report attributes the hard-reject rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub year: i64,
    pub deck: i64,
    pub source_id: i64,
    /// Platform type, -1 when missing
    pub platform_type: i64,
    pub duplicate_status: i64,
}

impl ReportContext {
    pub fn from_record(record: &CompositeRecord) -> Self {
        let int = |kind: SectionKind, name: &str| record.value(kind, name).as_i64();
        Self {
            year: int(SectionKind::CoreLocation, "yr").unwrap_or(i64::from(record.date.year())),
            deck: int(SectionKind::Icoads, "dck").unwrap_or(-1),
            source_id: int(SectionKind::Icoads, "sid").unwrap_or(-1),
            platform_type: int(SectionKind::Icoads, "pt").unwrap_or(-1),
            duplicate_status: int(SectionKind::Icoads, "dups").unwrap_or(0),
        }
    }
}

/// Per-report rejection decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rejections {
    /// Whole report rejected
    pub report: bool,
    pub sst: bool,
    pub air_temperature: bool,
    pub wind: bool,
    pub pressure: bool,
    pub humidity: bool,
}

impl Rejections {
    fn whole_report() -> Self {
        Self {
            report: true,
            sst: true,
            air_temperature: true,
            wind: true,
            pressure: true,
            humidity: true,
        }
    }
}

/// Observed values subject to trimming
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrimmedValues {
    pub sst: Value,
    pub at: Value,
    pub d: Value,
    pub w: Value,
    pub slp: Value,
    pub wbt: Value,
    pub dpt: Value,
    pub rh: Value,
}

impl TrimmedValues {
    fn from_record(record: &CompositeRecord) -> Self {
        let regular = |name: &str| record.value(SectionKind::CoreRegular, name).clone();
        Self {
            sst: regular("sst"),
            at: regular("at"),
            d: regular("d"),
            w: regular("w"),
            slp: regular("slp"),
            wbt: regular("wbt"),
            dpt: regular("dpt"),
            rh: record.value(SectionKind::Immt, "rh").clone(),
        }
    }

    fn trim(mut self, rejections: &Rejections) -> Self {
        if rejections.sst {
            self.sst = Value::Missing;
        }
        if rejections.air_temperature {
            self.at = Value::Missing;
        }
        if rejections.wind {
            self.d = Value::Missing;
            self.w = Value::Missing;
        }
        if rejections.pressure {
            self.slp = Value::Missing;
        }
        if rejections.humidity {
            self.rh = Value::Missing;
            self.wbt = Value::Missing;
            self.dpt = Value::Missing;
        }
        self
    }
}

/// Outcome of trimming one record
#[derive(Debug, Clone, PartialEq)]
pub enum TrimResult {
    /// The whole report is unusable
    Rejected,
    /// Usable report; rejected variables are missing
    Accepted(TrimmedValues),
}

impl TrimResult {
    pub fn is_rejected(&self) -> bool {
        matches!(self, TrimResult::Rejected)
    }
}

/// Apply the trimming rule table to a report's flags.
///
/// Fails only when the flags are missing altogether or the options are out
/// of range; every data condition yields a decision.
pub fn trim_flags(report: &ReportContext, flags: &FlagVector, options: &TrimOptions) -> Result<Rejections> {
    if flags.is_missing() {
        error!("Trimming flags missing for {} report", report.year);
        return Err(Error::configuration("trimming flags missing"));
    }
    options.validate()?;

    let f = |index: usize| flags.get(index);
    let yr = report.year;
    let pt = report.platform_type;
    let sid = report.source_id;
    let ds = report.duplicate_status;
    let rejected = Ok(Rejections::whole_report());

    // Duplicate policy
    match options.opdn {
        1 if f(slot::ND) == 2 => return rejected,
        2 if f(slot::ND) == 1 => return rejected,
        _ => {}
    }
    if ds > 2 && (yr >= DUPLICATE_RULE_YEAR || ds != LEGACY_DUPLICATE_STATUS) {
        return rejected;
    }
    if f(slot::LZ) == 1 {
        return rejected;
    }
    if (f(slot::ZQ) == 1 || f(slot::ZQ) == 3) && yr >= DUPLICATE_RULE_YEAR {
        return rejected;
    }

    if yr >= MODERN_ERA_YEAR {
        if sid == 25 && yr > 1984 {
            return rejected;
        }
        if sid == 30 && yr > 1984 {
            return rejected;
        }
        if sid == 33 && yr < 1986 {
            return rejected;
        }
        // TODO: both branches test OPPT == 0, so the second never runs; keep it
        // until the rule for OPPT == 1 is confirmed against archived output.
        if options.oppt == STRICT_PLATFORM_TYPES {
            if !(pt == 2 || pt == 5 || (pt == -1 && report.deck == 888)) {
                return rejected;
            }
            if sid == 70 || sid == 71 {
                return rejected;
            }
        } else if options.oppt == UNCONFIRMED_PLATFORM_TYPES {
            if pt > 5 {
                return rejected;
            }
            if sid == 70 || sid == 71 {
                return rejected;
            }
        }
    }

    let mut out = Rejections::default();

    // Source exclusion
    if (yr < MODERN_ERA_YEAR || !matches!(pt, 13 | 14 | 16)) && options.opse == 0 {
        out.sst |= f(slot::SZ) == 1;
        out.air_temperature |= f(slot::AZ) == 1;
        out.wind |= f(slot::WZ) == 1;
        if yr >= MODERN_ERA_YEAR && (sid == 70 || sid == 71) {
            out.wind = true;
        }
        out.pressure |= f(slot::PZ) == 1;
        out.humidity |= f(slot::RZ) == 1;
    }

    // Composite QC
    if options.opcq == 0 {
        out.sst |= f(slot::SQ) > 0;
        out.air_temperature |= f(slot::AQ) > 0;
        out.wind |= f(slot::WQ) > 0;
        out.pressure |= f(slot::PQ) > 0;
        out.humidity |= f(slot::RQ) > 0;
    }

    // Trimming flags; flag 11 is exempt for SST and pressure only below the fixed level
    let limit = options.trim_threshold();
    let exempt = |flag: i64| options.optf < 3 && options.op11 == 1 && flag == CALIBRATION_EXEMPT_FLAG;
    out.sst |= f(slot::SF) > limit && !exempt(f(slot::SF));
    out.air_temperature |= f(slot::AF) > limit;
    out.wind |= f(slot::UF) > limit || f(slot::VF) > limit;
    out.pressure |= f(slot::PF) > limit && !exempt(f(slot::PF));
    out.humidity |= f(slot::RF) > limit;

    Ok(out)
}

/// Trim the observed values of a decoded record
pub fn evaluate(record: &CompositeRecord, options: &TrimOptions) -> Result<TrimResult> {
    let flags = decode_flags(record);
    let report = ReportContext::from_record(record);
    let rejections = trim_flags(&report, &flags, options)?;

    if rejections.report {
        debug!("{}: report {:?} rejected", record.date, record.uid);
        return Ok(TrimResult::Rejected);
    }
    Ok(TrimResult::Accepted(
        TrimmedValues::from_record(record).trim(&rejections),
    ))
}

/// Trim a record in place; returns false when the whole report is rejected
pub fn apply(record: &mut CompositeRecord, options: &TrimOptions) -> Result<bool> {
    let values = match evaluate(record, options)? {
        TrimResult::Rejected => return Ok(false),
        TrimResult::Accepted(values) => values,
    };

    if let Some(regular) = record.section_mut(SectionKind::CoreRegular) {
        for (name, value) in [
            ("sst", values.sst),
            ("at", values.at),
            ("d", values.d),
            ("w", values.w),
            ("slp", values.slp),
            ("wbt", values.wbt),
            ("dpt", values.dpt),
        ] {
            if value.is_missing() {
                regular.insert(name.to_string(), Value::Missing);
            }
        }
    }
    if values.rh.is_missing() {
        if let Some(immt) = record.section_mut(SectionKind::Immt) {
            immt.insert("rh".to_string(), Value::Missing);
        }
    }
    Ok(true)
}
