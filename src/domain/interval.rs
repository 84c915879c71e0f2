use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar cadence that drives rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    Hourly,
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Hourly,
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Interval::Hourly => "hourly",
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }

    /// Shortest possible length of one period, in seconds.
    ///
    /// Used to warn about offsets that may span a whole period.
    #[must_use]
    pub const fn min_length_secs(self) -> i64 {
        match self {
            Interval::Hourly => 3_600,
            Interval::Daily => 86_400,
            Interval::Weekly => 7 * 86_400,
            Interval::Monthly => 28 * 86_400,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid rotate period [{0}]. Valid values: hourly, daily, weekly, monthly")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

impl TryFrom<String> for Interval {
    type Error = ParseIntervalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.as_str().to_string()
    }
}

/// How the host is asked to reopen its log files after a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RestartMethod {
    #[default]
    Graceful,
    Full,
}

impl RestartMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RestartMethod::Graceful => "graceful",
            RestartMethod::Full => "full",
        }
    }
}

impl fmt::Display for RestartMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Restart method must be \"full\" or \"graceful\", got [{0}]")]
pub struct ParseRestartMethodError(pub String);

impl FromStr for RestartMethod {
    type Err = ParseRestartMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graceful" => Ok(RestartMethod::Graceful),
            "full" => Ok(RestartMethod::Full),
            _ => Err(ParseRestartMethodError(s.to_string())),
        }
    }
}

impl TryFrom<String> for RestartMethod {
    type Error = ParseRestartMethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RestartMethod> for String {
    fn from(method: RestartMethod) -> Self {
        method.as_str().to_string()
    }
}
