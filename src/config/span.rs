//! Config-facing duration type.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A duration in configuration. Accepts either a bare integer
/// millisecond count (`2500`) or a humantime string (`"2s 500ms"`).
/// Serializes as the humantime form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span(Duration);

impl Span {
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    #[must_use]
    pub const fn get(self) -> Duration {
        self.0
    }

    /// Whole milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn as_millis(self) -> u64 {
        u64::try_from(self.0.as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Divides the span by `factor` for accelerated playback.
    /// Non-positive or non-finite factors leave the span unchanged.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        Duration::try_from_secs_f64(self.0.as_secs_f64() / factor).map_or(self, Self)
    }
}

impl From<Duration> for Span {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl From<Span> for Duration {
    fn from(value: Span) -> Self {
        value.0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpanVisitor;

        impl Visitor<'_> for SpanVisitor {
            type Value = Span;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("milliseconds as an integer or a duration string like \"2s 500ms\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Span::from_millis(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .map(Span::from_millis)
                    .map_err(|_| E::custom("duration must not be negative"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                humantime::parse_duration(value)
                    .map(Span)
                    .map_err(|e| E::custom(format!("invalid duration {value:?}: {e}")))
            }
        }

        deserializer.deserialize_any(SpanVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_integer_millis() {
        let span: Span = serde_yaml::from_str("2500").unwrap();
        assert_eq!(span, Span::from_millis(2500));
    }

    #[test]
    fn test_deserialize_humantime_string() {
        let span: Span = serde_yaml::from_str("\"2s 500ms\"").unwrap();
        assert_eq!(span, Span::from_millis(2500));
        let span: Span = serde_yaml::from_str("\"800ms\"").unwrap();
        assert_eq!(span, Span::from_millis(800));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_yaml::from_str::<Span>("-100").is_err());
        assert!(serde_yaml::from_str::<Span>("\"soon\"").is_err());
    }

    #[test]
    fn test_serialize_humantime() {
        let out = serde_yaml::to_string(&Span::from_millis(2500)).unwrap();
        assert_eq!(out.trim(), "2s 500ms");
    }

    #[test]
    fn test_as_millis() {
        assert_eq!(Span::from_millis(90_061_000).as_millis(), 90_061_000);
        assert!(Span::from_millis(0).is_zero());
    }

    #[test]
    fn test_scaled() {
        assert_eq!(Span::from_millis(3000).scaled(10.0), Span::from_millis(300));
        assert_eq!(Span::from_millis(1000).scaled(0.5), Span::from_millis(2000));
        assert_eq!(Span::from_millis(1000).scaled(0.0), Span::from_millis(1000));
        assert_eq!(
            Span::from_millis(1000).scaled(f64::NAN),
            Span::from_millis(1000)
        );
    }
}
