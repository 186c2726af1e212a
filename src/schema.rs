//! Field schema registry for the composite record formats.
//!
//! Describes every section of the positional (fixed-width, IMMA-style) and
//! delimited (41-column ISPD) record layouts: field order, byte widths,
//! numeric scaling and missing-value sentinels. The registry is built once
//! at start-up and never changes during a run; section dispatch is a closed
//! [`SectionKind`] enumeration so every consumer handles all sections.

use crate::constants::ATTACHMENT_HEADER_WIDTH;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};
use tracing::debug;

/// Every section known to the registry, in canonical encode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    CoreLocation,
    CoreRegular,
    Icoads,
    Immt,
    ReanalysisFeedback,
    Uida,
    Supplemental,
    IspdMeta,
    IspdObs,
    IspdTrack,
    IspdFeedback,
}

impl SectionKind {
    pub const ALL: [SectionKind; 11] = [
        SectionKind::CoreLocation,
        SectionKind::CoreRegular,
        SectionKind::Icoads,
        SectionKind::Immt,
        SectionKind::ReanalysisFeedback,
        SectionKind::Uida,
        SectionKind::Supplemental,
        SectionKind::IspdMeta,
        SectionKind::IspdObs,
        SectionKind::IspdTrack,
        SectionKind::IspdFeedback,
    ];

    /// Store-side name, also the prefix of the partition tables `{name}_{tidx}`
    pub fn table_name(&self) -> &'static str {
        match self {
            SectionKind::CoreLocation => "icoreloc",
            SectionKind::CoreRegular => "icorereg",
            SectionKind::Icoads => "iicoads",
            SectionKind::Immt => "iimmt5",
            SectionKind::ReanalysisFeedback => "irean",
            SectionKind::Uida => "iuida",
            SectionKind::Supplemental => "isuppl",
            SectionKind::IspdMeta => "ispdmeta",
            SectionKind::IspdObs => "ispdobs",
            SectionKind::IspdTrack => "ispdtrack",
            SectionKind::IspdFeedback => "ispdfeedback",
        }
    }

    pub fn family(&self) -> RecordFormat {
        match self {
            SectionKind::IspdMeta
            | SectionKind::IspdObs
            | SectionKind::IspdTrack
            | SectionKind::IspdFeedback => RecordFormat::Delimited,
            _ => RecordFormat::Positional,
        }
    }

    /// Whether this section carries the record date and position
    pub fn is_core(&self) -> bool {
        matches!(self, SectionKind::CoreLocation | SectionKind::IspdMeta)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Physical layout family of a record line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// Fixed-width sections concatenated on one line
    #[default]
    Positional,
    /// Forty-one comma-separated columns
    Delimited,
}

/// How the characters of a field are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Free text, right-trimmed on decode, left-justified on encode
    Text,
    /// Plain integer
    Integer,
    /// Fixed-point integer; real value = raw / divisor
    Fixed(u32),
}

impl Scale {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scale::Text)
    }

    pub fn divisor(&self) -> u32 {
        match self {
            Scale::Fixed(divisor) => *divisor,
            _ => 1,
        }
    }

    /// Digits after the decimal point when a real value is printed
    pub fn decimals(&self) -> usize {
        let mut divisor = self.divisor();
        let mut decimals = 0;
        while divisor >= 10 {
            divisor /= 10;
            decimals += 1;
        }
        decimals
    }
}

/// Source value meaning "missing"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Text(&'static str),
    /// Raw (already scaled) integer
    Number(i64),
}

/// Uniqueness rule of a repeatable section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    None,
    KeyedBy(&'static [&'static str]),
}

/// One named field within a section.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Zero-based position of the field within its section
    pub ordinal: usize,
    pub scale: Scale,
    /// Byte width; 0 means "rest of the line"
    pub width: usize,
    /// Byte offset from the section start (positional) or within the source column (delimited)
    pub offset: Option<usize>,
    pub missing: Option<Sentinel>,
    /// Column of the delimited variant holding this field
    pub source_column: Option<usize>,
}

impl FieldSpec {
    pub fn is_variable_width(&self) -> bool {
        self.width == 0
    }

    /// Whether a trimmed source text equals the missing-value sentinel
    pub fn is_sentinel_text(&self, text: &str) -> bool {
        matches!(self.missing, Some(Sentinel::Text(s)) if s == text)
    }

    pub fn is_sentinel_number(&self, raw: i64) -> bool {
        matches!(self.missing, Some(Sentinel::Number(n)) if n == raw)
    }
}

/// Ordered field layout plus section metadata.
#[derive(Debug, Clone)]
pub struct SectionSchema {
    pub kind: SectionKind,
    /// Component number used by field numbering; 0 for the core sections
    pub component_number: Option<u8>,
    /// Two-character attachment code written before the payload
    pub code: Option<&'static str>,
    pub repeatable: bool,
    /// Amount each written instance adds to the attribute count
    pub attc_contribution: u8,
    pub uniqueness: Uniqueness,
    fields: Vec<FieldSpec>,
    index: HashMap<&'static str, usize>,
}

impl SectionSchema {
    pub fn name(&self) -> &'static str {
        self.kind.table_name()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&FieldSpec> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| {
                Error::schema_lookup(format!(
                    "field '{}' is not defined in section '{}'",
                    name,
                    self.name()
                ))
            })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Bytes taken by the code and length header
    pub fn header_width(&self) -> usize {
        if self.code.is_some() {
            ATTACHMENT_HEADER_WIDTH
        } else {
            0
        }
    }

    pub fn is_variable_width(&self) -> bool {
        self.fields.iter().any(FieldSpec::is_variable_width)
    }

    /// Total width including the header; 0 for variable-length sections
    pub fn width(&self) -> usize {
        if self.is_variable_width() {
            0
        } else {
            self.header_width() + self.fields.iter().map(|f| f.width).sum::<usize>()
        }
    }

    /// Two-character length written after the code
    pub fn length_code(&self) -> String {
        format!("{:>2}", self.width())
    }
}

/// Component and field number of a named field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNumber {
    pub component: u8,
    pub field: u16,
    pub section: SectionKind,
}

type FieldRow = (&'static str, usize, Scale);
type DelimitedRow = (&'static str, usize, Option<usize>, usize, Scale, Sentinel);

use Scale::{Fixed, Integer as Int, Text};

const CORE_LOCATION_FIELDS: &[FieldRow] = &[
    ("yr", 4, Int),
    ("mo", 2, Int),
    ("dy", 2, Int),
    ("hr", 4, Fixed(100)),
    ("lat", 5, Fixed(100)),
    ("lon", 6, Fixed(100)),
    ("im", 2, Int),
    ("attc", 1, Text),
    ("ti", 1, Int),
    ("li", 1, Int),
    ("ds", 1, Int),
    ("vs", 1, Int),
    ("nid", 2, Int),
    ("ii", 2, Int),
    ("id", 9, Text),
    ("c1", 2, Text),
];

const CORE_REGULAR_FIELDS: &[FieldRow] = &[
    ("di", 1, Int),
    ("d", 3, Int),
    ("wi", 1, Int),
    ("w", 3, Fixed(10)),
    ("vi", 1, Int),
    ("vv", 2, Int),
    ("ww", 2, Int),
    ("w1", 1, Int),
    ("slp", 5, Fixed(10)),
    ("a", 1, Int),
    ("ppp", 3, Fixed(10)),
    ("it", 1, Int),
    ("at", 4, Fixed(10)),
    ("wbti", 1, Int),
    ("wbt", 4, Fixed(10)),
    ("dpti", 1, Int),
    ("dpt", 4, Fixed(10)),
    ("si", 2, Int),
    ("sst", 4, Fixed(10)),
    ("n", 1, Int),
    ("nh", 1, Int),
    ("cl", 1, Text),
    ("hi", 1, Int),
    ("h", 1, Text),
    ("cm", 1, Text),
    ("ch", 1, Text),
    ("wd", 2, Int),
    ("wp", 2, Int),
    ("wh", 2, Int),
    ("sd", 2, Int),
    ("sp", 2, Int),
    ("sh", 2, Int),
];

const ICOADS_FIELDS: &[FieldRow] = &[
    ("bsi", 1, Int),
    ("b10", 3, Int),
    ("b1", 2, Int),
    ("dck", 3, Int),
    ("sid", 3, Int),
    ("pt", 2, Int),
    ("dups", 2, Int),
    ("dupc", 1, Int),
    ("tc", 1, Int),
    ("pb", 1, Int),
    ("wx", 1, Int),
    ("sx", 1, Int),
    ("c2", 2, Int),
    ("sqz", 1, Text),
    ("sqa", 1, Text),
    ("aqz", 1, Text),
    ("aqa", 1, Text),
    ("uqz", 1, Text),
    ("uqa", 1, Text),
    ("vqz", 1, Text),
    ("vqa", 1, Text),
    ("pqz", 1, Text),
    ("pqa", 1, Text),
    ("dqz", 1, Text),
    ("dqa", 1, Text),
    ("nd", 1, Int),
    ("trms", 6, Text),
    ("nqcs", 14, Text),
    ("qce", 2, Int),
    ("lz", 1, Int),
    ("qcz", 2, Int),
];

const IMMT_FIELDS: &[FieldRow] = &[
    ("os", 1, Int),
    ("op", 1, Int),
    ("fm", 1, Text),
    ("immv", 1, Text),
    ("ix", 1, Int),
    ("w2", 1, Int),
    ("wmi", 1, Int),
    ("sd2", 2, Int),
    ("sp2", 2, Int),
    ("sh2", 2, Int),
    ("is", 1, Int),
    ("es", 2, Int),
    ("rs", 1, Int),
    ("ic1", 1, Text),
    ("ic2", 1, Text),
    ("ic3", 1, Text),
    ("ic4", 1, Text),
    ("ic5", 1, Text),
    ("ir", 1, Int),
    ("rrr", 3, Int),
    ("tr", 1, Int),
    ("nu", 1, Text),
    ("qci", 1, Int),
    ("hdg", 3, Int),
    ("cog", 3, Int),
    ("sog", 2, Int),
    ("sll", 2, Int),
    ("slhh", 3, Int),
    ("rwd", 3, Int),
    ("rws", 3, Fixed(10)),
    ("rh", 4, Fixed(10)),
    ("rhi", 1, Int),
    ("awsi", 1, Int),
    ("imono", 7, Text),
];

const REANALYSIS_FEEDBACK_FIELDS: &[FieldRow] = &[
    ("icnr", 1, Int),
    ("fnr", 2, Int),
    ("dpro", 2, Int),
    ("dprp", 2, Int),
    ("ufr", 1, Int),
    ("mfgr", 7, Fixed(10)),
    ("mfgsr", 5, Fixed(10)),
    ("mar", 7, Fixed(10)),
    ("masr", 5, Fixed(10)),
    ("bcr", 7, Fixed(10)),
    ("arcr", 4, Text),
    ("cdr", 8, Text),
    ("asir", 1, Int),
];

const UIDA_FIELDS: &[FieldRow] = &[
    ("uid", 6, Text),
    ("rn1", 1, Text),
    ("rn2", 1, Text),
    ("rn3", 1, Text),
    ("rsa", 1, Int),
    ("irf", 1, Int),
];

const SUPPLEMENTAL_FIELDS: &[FieldRow] = &[("atte", 1, Int), ("supd", 0, Text)];

const ISPD_META_FIELDS: &[DelimitedRow] = &[
    ("uid", 0, None, 19, Text, Sentinel::Text("9999999999999999999")),
    ("timestamp", 0, Some(0), 12, Text, Sentinel::Text("999999999999")),
    ("unoc", 0, Some(12), 7, Text, Sentinel::Text("9999999")),
    ("id", 32, None, 13, Text, Sentinel::Text("9999999999999")),
    ("year", 0, Some(0), 4, Int, Sentinel::Number(9999)),
    ("month", 0, Some(4), 2, Int, Sentinel::Number(-9)),
    ("day", 0, Some(6), 2, Int, Sentinel::Number(-9)),
    ("hour", 0, Some(8), 2, Int, Sentinel::Number(-9)),
    ("minute", 0, Some(10), 2, Int, Sentinel::Number(-9)),
    ("lat", 5, None, 6, Fixed(100), Sentinel::Number(-9999)),
    ("lon", 4, None, 7, Fixed(100), Sentinel::Number(99999)),
    ("elev", 6, None, 6, Int, Sentinel::Number(9999)),
    ("ant_offset", 7, None, 6, Fixed(100), Sentinel::Number(99999)),
];

const ISPD_OBS_FIELDS: &[DelimitedRow] = &[
    ("slp", 9, None, 8, Fixed(100), Sentinel::Number(999999)),
    ("slpe", 10, None, 6, Fixed(100), Sentinel::Number(-999)),
    ("slpqc", 11, None, 1, Int, Sentinel::Number(9)),
    ("sfp", 12, None, 8, Fixed(100), Sentinel::Number(999999)),
    ("sfpe", 13, None, 6, Fixed(100), Sentinel::Number(-999)),
    ("sfpqc", 14, None, 1, Int, Sentinel::Number(9)),
    ("obp", 8, None, 8, Fixed(100), Sentinel::Number(999999)),
    ("id_type", 2, None, 2, Int, Sentinel::Number(-9)),
    ("ncep_type", 1, None, 3, Int, Sentinel::Number(-99)),
    ("ispdbcid", 3, None, 6, Text, Sentinel::Text("-99999")),
];

const ISPD_TRACK_FIELDS: &[DelimitedRow] = &[
    ("sname", 31, None, 30, Text, Sentinel::Text("-99999999999999999999999999999")),
    ("slib", 33, None, 3, Text, Sentinel::Text("999")),
    ("icoads_sid", 34, None, 3, Int, Sentinel::Number(-99)),
    ("icoads_dck", 35, None, 3, Int, Sentinel::Number(-99)),
    ("icoads_pt", 36, None, 2, Int, Sentinel::Number(-9)),
    ("sflsd", 37, None, 1, Text, Sentinel::Text("9")),
    ("rtc", 38, None, 5, Text, Sentinel::Text("99999")),
    ("qcislp", 39, None, 5, Text, Sentinel::Text("99999")),
    ("qcisfp", 40, None, 5, Text, Sentinel::Text("99999")),
];

const ISPD_FEEDBACK_FIELDS: &[DelimitedRow] = &[
    ("mdpavims", 15, None, 7, Fixed(100), Sentinel::Number(999999)),
    ("epvims", 16, None, 5, Fixed(100), Sentinel::Number(-999)),
    ("bias", 17, None, 7, Fixed(100), Sentinel::Number(0)),
    ("sfsfp", 18, None, 1, Int, Sentinel::Number(9)),
    ("ai", 19, None, 1, Int, Sentinel::Number(9)),
    ("uc", 20, None, 1, Int, Sentinel::Number(9)),
    ("bcf", 21, None, 1, Int, Sentinel::Number(9)),
    ("bf", 22, None, 1, Int, Sentinel::Number(9)),
    ("qc", 23, None, 1, Int, Sentinel::Number(9)),
    ("emfg", 24, None, 7, Fixed(100), Sentinel::Number(999999)),
    ("sdeg", 25, None, 5, Fixed(100), Sentinel::Number(-999)),
    ("mpmemfg", 26, None, 6, Fixed(100), Sentinel::Number(99999)),
    ("emap", 27, None, 7, Fixed(100), Sentinel::Number(999999)),
    ("sdeap", 28, None, 5, Fixed(100), Sentinel::Number(-999)),
    ("mpmema", 29, None, 6, Fixed(100), Sentinel::Number(99999)),
    ("melv", 30, None, 4, Int, Sentinel::Number(9999)),
];

/// Static description of every section plus cached name/number lookups.
#[derive(Debug)]
pub struct SchemaRegistry {
    sections: Vec<SectionSchema>,
    by_code: HashMap<&'static str, SectionKind>,
    by_name: HashMap<&'static str, SectionKind>,
    name_cache: RwLock<HashMap<String, FieldNumber>>,
    number_cache: RwLock<HashMap<(u8, u16), (&'static str, SectionKind)>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let sections: Vec<SectionSchema> = SectionKind::ALL.iter().map(|k| build_section(*k)).collect();

        let by_code = sections
            .iter()
            .filter_map(|s| s.code.map(|code| (code, s.kind)))
            .collect();
        let by_name = sections.iter().map(|s| (s.name(), s.kind)).collect();

        debug!("Schema registry built with {} sections", sections.len());

        Self {
            sections,
            by_code,
            by_name,
            name_cache: RwLock::new(HashMap::new()),
            number_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide registry, built on first use
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(SchemaRegistry::new)
    }

    pub fn schema(&self, kind: SectionKind) -> &SectionSchema {
        &self.sections[kind.index()]
    }

    /// Schema by store-side section name
    pub fn section(&self, name: &str) -> Result<&SectionSchema> {
        self.by_name
            .get(name)
            .map(|kind| self.schema(*kind))
            .ok_or_else(|| Error::schema_lookup(format!("unknown section '{}'", name)))
    }

    /// Section selected by a two-character attachment code
    pub fn kind_for_code(&self, code: &str) -> Option<SectionKind> {
        self.by_code.get(code).copied()
    }

    pub fn field(&self, kind: SectionKind, name: &str) -> Result<&FieldSpec> {
        self.schema(kind).field(name)
    }

    /// Sections of one layout family in canonical order
    pub fn sections_in(&self, format: RecordFormat) -> impl Iterator<Item = &SectionSchema> {
        self.sections
            .iter()
            .filter(move |s| s.kind.family() == format)
    }

    /// Component and field number of a positional field; first section in canonical order wins.
    pub fn name2number(&self, name: &str) -> Result<FieldNumber> {
        if let Ok(cache) = self.name_cache.read() {
            if let Some(hit) = cache.get(name) {
                return Ok(*hit);
            }
        }

        let schema = self
            .sections_in(RecordFormat::Positional)
            .find(|s| s.has_field(name))
            .ok_or_else(|| Error::schema_lookup(format!("cannot find field name '{}'", name)))?;
        let field = schema.field(name)?;
        let number = FieldNumber {
            component: schema.component_number.unwrap_or(0),
            field: (field.ordinal + field_number_offset(schema.kind)) as u16,
            section: schema.kind,
        };

        if let Ok(mut cache) = self.name_cache.write() {
            cache.insert(name.to_string(), number);
        }
        Ok(number)
    }

    /// Field name and owning section for a component/field number pair.
    pub fn number2name(&self, component: u8, field: u16) -> Result<(&'static str, SectionKind)> {
        if let Ok(cache) = self.number_cache.read() {
            if let Some(hit) = cache.get(&(component, field)) {
                return Ok(*hit);
            }
        }

        let kind = if component > 0 {
            self.sections_in(RecordFormat::Positional)
                .find(|s| s.component_number == Some(component) && !s.kind.is_core())
                .map(|s| s.kind)
                .ok_or_else(|| {
                    Error::schema_lookup(format!("cannot find component {}", component))
                })?
        } else if field < field_number_offset(SectionKind::CoreRegular) as u16 {
            SectionKind::CoreLocation
        } else {
            SectionKind::CoreRegular
        };

        let offset = field_number_offset(kind);
        let spec = self
            .schema(kind)
            .fields()
            .iter()
            .find(|f| f.ordinal + offset == field as usize)
            .ok_or_else(|| {
                Error::schema_lookup(format!(
                    "cannot find field {} in component '{}'",
                    field,
                    kind.table_name()
                ))
            })?;

        let resolved = (spec.name, kind);
        if let Ok(mut cache) = self.number_cache.write() {
            cache.insert((component, field), resolved);
        }
        Ok(resolved)
    }
}

/// First field number of a section: core location starts at 1, core
/// regular continues after it, attachments start after code and length.
fn field_number_offset(kind: SectionKind) -> usize {
    match kind {
        SectionKind::CoreLocation => 1,
        SectionKind::CoreRegular => 1 + CORE_LOCATION_FIELDS.len(),
        _ => 3,
    }
}

fn build_section(kind: SectionKind) -> SectionSchema {
    let (component_number, code, repeatable, uniqueness) = match kind {
        SectionKind::CoreLocation | SectionKind::CoreRegular => (Some(0), None, false, Uniqueness::None),
        SectionKind::Icoads => (Some(1), Some(" 1"), false, Uniqueness::None),
        SectionKind::Immt => (Some(5), Some(" 5"), false, Uniqueness::None),
        SectionKind::ReanalysisFeedback => (
            Some(95),
            Some("95"),
            true,
            Uniqueness::KeyedBy(&["icnr", "fnr", "dpro"]),
        ),
        SectionKind::Uida => (Some(98), Some("98"), false, Uniqueness::None),
        SectionKind::Supplemental => (Some(99), Some("99"), false, Uniqueness::None),
        SectionKind::IspdMeta
        | SectionKind::IspdObs
        | SectionKind::IspdTrack
        | SectionKind::IspdFeedback => (None, None, false, Uniqueness::None),
    };

    let fields = match kind {
        SectionKind::CoreLocation => positional_fields(CORE_LOCATION_FIELDS, 0),
        SectionKind::CoreRegular => positional_fields(CORE_REGULAR_FIELDS, 0),
        SectionKind::Icoads => positional_fields(ICOADS_FIELDS, ATTACHMENT_HEADER_WIDTH),
        SectionKind::Immt => positional_fields(IMMT_FIELDS, ATTACHMENT_HEADER_WIDTH),
        SectionKind::ReanalysisFeedback => {
            positional_fields(REANALYSIS_FEEDBACK_FIELDS, ATTACHMENT_HEADER_WIDTH)
        }
        SectionKind::Uida => positional_fields(UIDA_FIELDS, ATTACHMENT_HEADER_WIDTH),
        SectionKind::Supplemental => positional_fields(SUPPLEMENTAL_FIELDS, ATTACHMENT_HEADER_WIDTH),
        SectionKind::IspdMeta => delimited_fields(ISPD_META_FIELDS),
        SectionKind::IspdObs => delimited_fields(ISPD_OBS_FIELDS),
        SectionKind::IspdTrack => delimited_fields(ISPD_TRACK_FIELDS),
        SectionKind::IspdFeedback => delimited_fields(ISPD_FEEDBACK_FIELDS),
    };

    let index = fields.iter().map(|f| (f.name, f.ordinal)).collect();
    let attc_contribution = if kind.is_core() || kind == SectionKind::CoreRegular || kind.family() == RecordFormat::Delimited {
        0
    } else {
        1
    };

    SectionSchema {
        kind,
        component_number,
        code,
        repeatable,
        attc_contribution,
        uniqueness,
        fields,
        index,
    }
}

fn positional_fields(rows: &[FieldRow], header_width: usize) -> Vec<FieldSpec> {
    let mut offset = header_width;
    rows.iter()
        .enumerate()
        .map(|(ordinal, &(name, width, scale))| {
            let spec = FieldSpec {
                name,
                ordinal,
                scale,
                width,
                offset: Some(offset),
                missing: None,
                source_column: None,
            };
            offset += width;
            spec
        })
        .collect()
}

fn delimited_fields(rows: &[DelimitedRow]) -> Vec<FieldSpec> {
    rows.iter()
        .enumerate()
        .map(|(ordinal, &(name, column, offset, width, scale, missing))| FieldSpec {
            name,
            ordinal,
            scale,
            width,
            offset,
            missing: Some(missing),
            source_column: Some(column),
        })
        .collect()
}
