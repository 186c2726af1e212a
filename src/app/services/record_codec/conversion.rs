//! Conversion between raw fixed-point integers and real values
//!
//! Only fields with a fixed-point scale change; text and plain integer
//! fields pass through untouched, as do missing values.

use crate::models::{round_half_away, CompositeRecord, Value};
use crate::schema::{Scale, SchemaRegistry};

/// Replace every scaled raw integer by its real value (raw / divisor)
pub fn float_record(registry: &SchemaRegistry, record: &mut CompositeRecord) {
    convert(registry, record, |value, divisor| match value {
        Value::Integer(raw) => Some(Value::Decimal(*raw as f64 / f64::from(divisor))),
        _ => None,
    });
}

/// Replace every real value of a scaled field by its raw integer, rounding half away from zero
pub fn integer_record(registry: &SchemaRegistry, record: &mut CompositeRecord) {
    convert(registry, record, |value, divisor| match value {
        Value::Decimal(real) => Some(Value::Integer(round_half_away(real * f64::from(divisor)))),
        _ => None,
    });
}

fn convert<F>(registry: &SchemaRegistry, record: &mut CompositeRecord, f: F)
where
    F: Fn(&Value, u32) -> Option<Value>,
{
    for (kind, instances) in record.sections.iter_mut() {
        let schema = registry.schema(*kind);
        for field in schema.fields() {
            let Scale::Fixed(divisor) = field.scale else {
                continue;
            };
            for values in instances.iter_mut() {
                if let Some(value) = values.get_mut(field.name) {
                    if let Some(converted) = f(value, divisor) {
                        *value = converted;
                    }
                }
            }
        }
    }
}
