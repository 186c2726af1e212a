//! Field patches, time/space matching and duplicate lookup over stored rows

use super::RecordExporter;
use crate::app::services::record_store::rows::row_id;
use crate::app::services::record_store::{partition_table, Predicate, RecordStore, Row};
use crate::error::{Error, Result};
use crate::models::{DecodedLine, FieldValues, Value};
use crate::schema::{RecordFormat, SectionKind};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Time and space bounds of a match, in stored (scaled) units.
///
/// Hours and latitudes are inclusive ranges. Longitudes run from `west` to
/// `east` and wrap across the dateline when `west > east`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchWindow {
    pub first_hour: i64,
    pub last_hour: i64,
    pub south: i64,
    pub north: i64,
    pub west: i64,
    pub east: i64,
    /// At least one of these fields must hold a value
    pub variables: Vec<String>,
}

impl MatchWindow {
    pub fn new(hours: (i64, i64), latitudes: (i64, i64), longitudes: (i64, i64)) -> Self {
        Self {
            first_hour: hours.0,
            last_hour: hours.1,
            south: latitudes.0,
            north: latitudes.1,
            west: longitudes.0,
            east: longitudes.1,
            variables: Vec::new(),
        }
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    fn contains_longitude(&self, lon: i64) -> bool {
        if self.west <= self.east {
            self.west <= lon && lon <= self.east
        } else {
            !(lon > self.east && lon < self.west)
        }
    }
}

/// Raw scaled value of a stored field
fn raw(row: &Row, field: &str, divisor: u32) -> Option<i64> {
    row.get(field).and_then(|value| value.scaled_integer(divisor))
}

impl RecordExporter {
    fn hour_field(&self) -> &'static str {
        match self.format {
            RecordFormat::Positional => "hr",
            RecordFormat::Delimited => "hour",
        }
    }

    fn day_field(&self) -> &'static str {
        match self.format {
            RecordFormat::Positional => "dy",
            RecordFormat::Delimited => "day",
        }
    }

    fn divisor(&self, section: SectionKind, field: &str) -> Result<u32> {
        Ok(self.codec.registry().field(section, field)?.scale.divisor())
    }

    /// Section of this format owning a field name; first in canonical order wins
    fn owning_section(&self, field: &str) -> Result<SectionKind> {
        self.codec
            .registry()
            .sections_in(self.format)
            .find(|schema| schema.has_field(field))
            .map(|schema| schema.kind)
            .ok_or_else(|| Error::schema_lookup(format!("cannot find field name '{}'", field)))
    }

    /// Store one field of a line on the row its UID names.
    ///
    /// Returns false when the line carries no value for the field, when the
    /// parent row has no such section, or when the stored value already
    /// matches.
    pub fn set_field(
        &self,
        store: &mut dyn RecordStore,
        line: &str,
        section: SectionKind,
        field: &str,
    ) -> Result<bool> {
        self.codec.registry().field(section, field)?;

        let decoded = self.codec.decode(line, self.format)?;
        let (uid, values) = match &decoded {
            DecodedLine::Primary(record) => (record.uid.clone(), record.section(section)),
            DecodedLine::Attachment(attachment) => (
                Some(attachment.uid.clone()),
                attachment.sections.get(&section).and_then(|v| v.first()),
            ),
        };
        let Some(value) = values.and_then(|v| v.get(field)).filter(|v| !v.is_missing()) else {
            debug!("No {}.{} on line", section, field);
            return Ok(false);
        };
        let uid = uid.ok_or_else(|| Error::missing_uid("", "line carries no UID section"))?;

        let binding = self.shards().lookup_uid(&*store, &uid)?;
        let table = partition_table(section.table_name(), binding.location.partition_id);
        if !store.table_exists(&table) {
            warn!("{}: {} has no {} table", uid, binding.date, table);
            return Ok(false);
        }

        let on_row = Predicate::all().eq("iidx", binding.location.row_id);
        if store.count(&table, &on_row.clone().eq(field, value.clone()))? > 0 {
            return Ok(false);
        }

        let mut patch = Row::new();
        patch.insert(field.to_string(), value.clone());
        let touched = store.update(&table, &on_row, &patch)?;
        debug!("{}: {}.{} set on {} row(s)", uid, table, field, touched);
        Ok(touched > 0)
    }

    /// Row ids of the records of a date inside a time/space window
    pub fn match_records_for_date(
        &self,
        store: &dyn RecordStore,
        date: NaiveDate,
        window: &MatchWindow,
    ) -> Result<Vec<u64>> {
        let core_kind = self.core_kind();
        let hour_divisor = self.divisor(core_kind, self.hour_field())?;
        let position_divisor = self.divisor(core_kind, "lat")?;

        let mut variables: Vec<(String, SectionKind)> = Vec::new();
        for name in &window.variables {
            variables.push((name.clone(), self.owning_section(name)?));
        }

        let partition = self.shards().resolve_partition(store, date)?;
        let mut matched = Vec::new();

        for row in self.read_core_for_date(store, date)? {
            let in_time = raw(&row, self.hour_field(), hour_divisor)
                .is_some_and(|hr| window.first_hour <= hr && hr <= window.last_hour);
            let in_band = raw(&row, "lat", position_divisor)
                .is_some_and(|lat| window.south <= lat && lat <= window.north);
            let in_span = raw(&row, "lon", position_divisor).is_some_and(|lon| window.contains_longitude(lon));
            if !(in_time && in_band && in_span) {
                continue;
            }
            let Some(id) = row_id(&row) else { continue };

            if variables.is_empty() || self.has_any_value(store, partition, &row, id, &variables)? {
                matched.push(id);
            }
        }

        debug!("{}: {} records matched", date, matched.len());
        Ok(matched)
    }

    fn has_any_value(
        &self,
        store: &dyn RecordStore,
        partition: u32,
        core: &Row,
        id: u64,
        variables: &[(String, SectionKind)],
    ) -> Result<bool> {
        let mut fetched: HashMap<SectionKind, Vec<Row>> = HashMap::new();
        for (name, section) in variables {
            if *section == self.core_kind() {
                if core.get(name).is_some_and(|v| !v.is_missing()) {
                    return Ok(true);
                }
                continue;
            }
            if !fetched.contains_key(section) {
                let table = partition_table(section.table_name(), partition);
                let rows = if store.table_exists(&table) {
                    store.select(&table, &Predicate::all().eq("iidx", id))?
                } else {
                    Vec::new()
                };
                fetched.insert(*section, rows);
            }
            let found = fetched
                .get(section)
                .is_some_and(|rows| rows.iter().any(|row| row.get(name).is_some_and(|v| !v.is_missing())));
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Row id of a stored record with the same date, day, hour, position and identifier.
    ///
    /// A missing value only matches a missing value.
    pub fn find_record(&self, store: &dyn RecordStore, date: NaiveDate, core: &FieldValues) -> Result<Option<u64>> {
        let partition = self.shards().resolve_partition(store, date)?;
        let table = partition_table(self.core_kind().table_name(), partition);
        if !store.table_exists(&table) {
            return Ok(None);
        }

        let mut predicate = Predicate::all().eq("date", date);
        for field in [self.day_field(), self.hour_field(), "lat", "lon", "id"] {
            let value = core.get(field).cloned().unwrap_or(Value::Missing);
            predicate = predicate.eq(field, value);
        }

        Ok(store
            .select(&table, &predicate)?
            .iter()
            .filter_map(row_id)
            .min())
    }
}
