use std::convert::TryFrom;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ArgumentError;
use crate::pcap::TsResolution;

/// Capture timestamp of a record: seconds since epoch, and a fractional part
///
/// The unit of `frac` (microseconds or nanoseconds) is given by the resolution
/// of the file header the record is written into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Timestamp {
    pub secs: u32,
    pub frac: u32,
}

impl Timestamp {
    pub const fn new(secs: u32, frac: u32) -> Timestamp {
        Timestamp { secs, frac }
    }

    /// Convert a duration since epoch, truncating to the given resolution
    pub fn from_duration(
        d: Duration,
        resolution: TsResolution,
    ) -> Result<Timestamp, ArgumentError> {
        let secs =
            u32::try_from(d.as_secs()).map_err(|_| ArgumentError::LengthOverflow(d.as_secs()))?;
        let frac = match resolution {
            TsResolution::Microsecond => d.subsec_micros(),
            TsResolution::Nanosecond => d.subsec_nanos(),
        };
        Ok(Timestamp { secs, frac })
    }

    /// Convert a system time; times before epoch are clamped to epoch
    pub fn from_system_time(
        t: SystemTime,
        resolution: TsResolution,
    ) -> Result<Timestamp, ArgumentError> {
        let d = t.duration_since(UNIX_EPOCH).unwrap_or_default();
        Timestamp::from_duration(d, resolution)
    }

    /// Check that the fractional part is below one second in `resolution` units
    pub fn check(&self, resolution: TsResolution) -> Result<(), ArgumentError> {
        let units_per_sec = resolution.units_per_sec();
        if self.frac >= units_per_sec {
            return Err(ArgumentError::TimestampOutOfRange {
                frac: self.frac,
                units_per_sec,
            });
        }
        Ok(())
    }

    /// Return the timestamp `units` fractional units later, carrying into seconds
    pub fn add_units(
        &self,
        units: u64,
        resolution: TsResolution,
    ) -> Result<Timestamp, ArgumentError> {
        let per_sec = u64::from(resolution.units_per_sec());
        let total = u64::from(self.frac) + units;
        let secs = u64::from(self.secs) + total / per_sec;
        let secs = u32::try_from(secs).map_err(|_| ArgumentError::LengthOverflow(secs))?;
        Ok(Timestamp {
            secs,
            frac: (total % per_sec) as u32,
        })
    }

    pub fn to_duration(&self, resolution: TsResolution) -> Duration {
        let frac = match resolution {
            TsResolution::Microsecond => Duration::from_micros(u64::from(self.frac)),
            TsResolution::Nanosecond => Duration::from_nanos(u64::from(self.frac)),
        };
        Duration::from_secs(u64::from(self.secs)) + frac
    }
}
