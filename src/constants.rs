//! Application constants for the ISPD processor
//!
//! Line geometry, store table names, default thresholds and the fixed
//! numeric constants used by the quality-control engine.

// =============================================================================
// Positional Line Geometry
// =============================================================================

/// Width of the core location section at the start of every primary line
pub const CORE_LOCATION_WIDTH: usize = 45;

/// Width of the core regular section that follows the location section
pub const CORE_REGULAR_WIDTH: usize = 63;

/// Combined width of both core sections
pub const CORE_WIDTH: usize = CORE_LOCATION_WIDTH + CORE_REGULAR_WIDTH;

/// Character position of the single base-36 attribute count (ATTC) in a primary line
pub const ATTC_POSITION: usize = 25;

/// Attachments are consumed while at least this many bytes remain
pub const MIN_SECTION_REMAINDER: usize = 4;

/// Every attachment starts with a two-character code and a two-character length
pub const ATTACHMENT_HEADER_WIDTH: usize = 4;

/// Continuation and standalone attachment lines start with the UID attachment header
pub const UID_LINE_PREFIX: &str = "9815";

/// Width of the complete UID attachment (header included)
pub const UID_ATTACHMENT_WIDTH: usize = 15;

/// Width of the opaque UID carried by the UID attachment
pub const UID_WIDTH: usize = 6;

/// Offset of the UID inside a line that starts with the UID attachment
pub const UID_LINE_OFFSET: usize = 4;

/// Number of leading characters of the UID that select a lookup table
pub const UID_PREFIX_WIDTH: usize = 2;

/// Width of the sub-identifier used as lookup key inside a prefix table
pub const UID_SUFFIX_WIDTH: usize = 4;

// =============================================================================
// Delimited Variant
// =============================================================================

/// Number of comma-separated columns in a delimited record
pub const DELIMITED_FIELD_COUNT: usize = 41;

/// Column separator of the delimited variant
pub const DELIMITER: char = ',';

/// Width of the composite UID (timestamp + observation number) in column 0
pub const DELIMITED_UID_WIDTH: usize = 19;

// =============================================================================
// Record Store Layout
// =============================================================================

/// Store tables owned by the shard and inventory manager
pub mod tables {
    /// One row per ingestion batch (date or file)
    pub const INVENTORY: &str = "inventory";

    /// Template of the per-prefix UID lookup tables (`itidx_{prefix}`)
    pub const UID_INDEX: &str = "itidx";

    /// Running per-partition section counts
    pub const SECTION_COUNTS: &str = "iattm";

    /// Running per-date section counts
    pub const DAILY_SECTION_COUNTS: &str = "iattm_daily";
}

/// Default number of rows a partition may hold before rolling over
pub const DEFAULT_PARTITION_CAPACITY: u64 = 1_000_000;

/// Partition used when the store holds no inventory yet
pub const BOOTSTRAP_PARTITION: u32 = 1;

// =============================================================================
// Derived Field Constants
// =============================================================================

/// Digit alphabet of the compact base-36 counters and flag characters
pub const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Mean Earth radius used for bearing projections
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wind direction code for calm or variable winds
pub const VARIABLE_WIND_DIRECTION: i64 = 361;

// =============================================================================
// Quality Control Constants
// =============================================================================

/// Constants of the legacy trimming decision code
pub mod quality {
    /// Number of slots in the decoded trimming flag vector
    pub const FLAG_VECTOR_LEN: usize = 23;

    /// Number of packed composite NCDC-QC flag characters
    pub const NCDC_QC_FLAG_COUNT: usize = 14;

    /// Number of packed trimming flag characters
    pub const TRIM_FLAG_COUNT: usize = 6;

    /// Number of ten-degree bearing boxes covering the globe
    pub const BEARING_BOX_COUNT: i64 = 648;

    /// Bearing boxes per hemisphere band
    pub const BEARING_BOXES_PER_BAND: i64 = 324;

    /// Location code of a report exactly at the north pole
    pub const NORTH_POLE_CODE: i64 = 1;

    /// Location code of a report exactly at the south pole
    pub const SOUTH_POLE_CODE: i64 = 16202;

    /// Trimming threshold used when OPTF selects the fixed level
    pub const FIXED_TRIM_THRESHOLD: i64 = 12;

    /// Trimming flag value exempted for SST and SLP when OP11 is set
    pub const CALIBRATION_EXEMPT_FLAG: i64 = 11;

    /// First year in which platform and source-ID exclusions apply
    pub const MODERN_ERA_YEAR: i64 = 1980;

    /// First year in which duplicate-status and location-QC rejections are unconditional
    pub const DUPLICATE_RULE_YEAR: i64 = 1950;

    /// Duplicate status allowed above the threshold before 1950
    pub const LEGACY_DUPLICATE_STATUS: i64 = 6;
}
