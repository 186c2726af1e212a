//! Trimming options
//!
//! The six toggles recognized by the trimming rule table. Field names
//! serialize under their historical upper-case keys so option files written
//! for the legacy tools load unchanged.

use crate::constants::quality::FIXED_TRIM_THRESHOLD;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Caller-supplied trimming options; never mutated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimOptions {
    /// Platform-duplicate policy (0..=2)
    #[serde(rename = "OPDN")]
    pub opdn: i64,

    /// Platform-type strictness (0..=1)
    #[serde(rename = "OPPT")]
    pub oppt: i64,

    /// Honor source-exclusion flags when 0 (0..=1)
    #[serde(rename = "OPSE")]
    pub opse: i64,

    /// Honor composite QC flags when 0 (0..=1)
    #[serde(rename = "OPCQ")]
    pub opcq: i64,

    /// Trimming strictness; 3 selects the fixed threshold (0..=3)
    #[serde(rename = "OPTF")]
    pub optf: i64,

    /// Exempt trimming flag 11 for SST and pressure (0..=1)
    #[serde(rename = "OP11")]
    pub op11: i64,
}

impl Default for TrimOptions {
    /// Enhanced trimming
    fn default() -> Self {
        Self {
            opdn: 0,
            oppt: 1,
            opse: 0,
            opcq: 0,
            optf: 2,
            op11: 1,
        }
    }
}

impl TrimOptions {
    pub fn with_opdn(mut self, opdn: i64) -> Self {
        self.opdn = opdn;
        self
    }

    pub fn with_oppt(mut self, oppt: i64) -> Self {
        self.oppt = oppt;
        self
    }

    pub fn with_opse(mut self, opse: i64) -> Self {
        self.opse = opse;
        self
    }

    pub fn with_opcq(mut self, opcq: i64) -> Self {
        self.opcq = opcq;
        self
    }

    pub fn with_optf(mut self, optf: i64) -> Self {
        self.optf = optf;
        self
    }

    pub fn with_op11(mut self, op11: i64) -> Self {
        self.op11 = op11;
        self
    }

    /// Flag magnitude above which a variable is trimmed
    pub fn trim_threshold(&self) -> i64 {
        if self.optf == 3 {
            FIXED_TRIM_THRESHOLD
        } else {
            self.optf * 2 + 1
        }
    }

    /// Reject any toggle outside its recognized range
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("OPDN", self.opdn, 2),
            ("OPPT", self.oppt, 1),
            ("OPSE", self.opse, 1),
            ("OPCQ", self.opcq, 1),
            ("OPTF", self.optf, 3),
            ("OP11", self.op11, 1),
        ];
        for (name, value, max) in ranges {
            if !(0..=max).contains(&value) {
                return Err(Error::configuration(format!(
                    "{}={} is outside 0..={}",
                    name, value, max
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_enhanced_trimming() {
        let options = TrimOptions::default();
        assert_eq!((options.opdn, options.oppt, options.optf, options.op11), (0, 1, 2, 1));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_thresholds() {
        let options = TrimOptions::default();
        assert_eq!(options.with_optf(0).trim_threshold(), 1);
        assert_eq!(options.with_optf(1).trim_threshold(), 3);
        assert_eq!(options.with_optf(2).trim_threshold(), 5);
        assert_eq!(options.with_optf(3).trim_threshold(), 12);
    }

    #[test]
    fn test_out_of_range_is_fatal() {
        let err = TrimOptions::default().with_optf(4).validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("OPTF=4"));
        assert!(TrimOptions::default().with_opdn(-1).validate().is_err());
    }

    #[test]
    fn test_upper_case_keys() {
        let options: TrimOptions = serde_json::from_str(r#"{"OPTF": 1, "OP11": 0}"#).unwrap();
        assert_eq!(options.optf, 1);
        assert_eq!(options.op11, 0);
        assert_eq!(options.oppt, 1);
    }
}
