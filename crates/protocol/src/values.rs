use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a user-supplied value is outside a closed value set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} value {value:?} is not valid ({})", expected.join("|"))]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Generates an oracle-facing string enum.
///
/// Oracle output is untrusted, so every value deserializes: strings outside
/// the closed set (and `null`, read as `""`) land in `Unrecognized` and are
/// reported by validation instead of failing the parse.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "Option<String>", into = "String")]
        pub enum $name {
            $($variant,)+
            Unrecognized(String),
        }

        impl $name {
            pub const KNOWN: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unrecognized(raw) => raw,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unrecognized(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Unrecognized(String::new())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unrecognized(raw),
                }
            }
        }

        impl From<Option<String>> for $name {
            fn from(raw: Option<String>) -> Self {
                Self::from(raw.unwrap_or_default())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            /// Case-insensitive parse that only accepts members of the closed set.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match Self::from(s.trim().to_ascii_uppercase()) {
                    Self::Unrecognized(_) => Err(UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::KNOWN,
                    }),
                    known => Ok(known),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Finding severity, ordered `INFO < WARN < CRITICAL`.
    Severity, "severity" {
        Info => "INFO",
        Warn => "WARN",
        Critical => "CRITICAL",
    }
}

wire_enum! {
    /// Implementation status of one spec or plan item.
    CoverageStatus, "status" {
        Implemented => "IMPLEMENTED",
        Partial => "PARTIAL",
        NotImplemented => "NOT_IMPLEMENTED",
        Unclear => "UNCLEAR",
    }
}

wire_enum! {
    /// Reliability tier of an evidence citation.
    Confidence, "confidence" {
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
    }
}

impl Severity {
    /// Position in the severity order; `None` for unrecognized values.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Info => Some(0),
            Self::Warn => Some(1),
            Self::Critical => Some(2),
            Self::Unrecognized(_) => None,
        }
    }

    /// One step up the ladder. Saturates at CRITICAL; unrecognized values are left alone.
    #[must_use]
    pub fn escalated(&self) -> Self {
        match self {
            Self::Info => Self::Warn,
            Self::Warn | Self::Critical => Self::Critical,
            Self::Unrecognized(raw) => Self::Unrecognized(raw.clone()),
        }
    }
}

impl CoverageStatus {
    /// True for every known status other than IMPLEMENTED.
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Partial | Self::NotImplemented | Self::Unclear)
    }
}

/// Reads `null` as the field's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads an optional confidence, treating `""` and `null` as absent.
pub(crate) fn optional_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()).map(Confidence::from))
}

/// Overall classification of an analysis run, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Aligned,
    PartiallyAligned,
    DriftDetected,
    Violation,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Aligned,
        Verdict::PartiallyAligned,
        Verdict::DriftDetected,
        Verdict::Violation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Aligned => "ALIGNED",
            Verdict::PartiallyAligned => "PARTIALLY_ALIGNED",
            Verdict::DriftDetected => "DRIFT_DETECTED",
            Verdict::Violation => "VIOLATION",
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl FromStr for Verdict {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Verdict::ALL
            .into_iter()
            .find(|verdict| verdict.as_str() == wanted)
            .ok_or_else(|| UnknownValue {
                kind: "verdict",
                value: s.to_string(),
                expected: &["ALIGNED", "PARTIALLY_ALIGNED", "DRIFT_DETECTED", "VIOLATION"],
            })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
