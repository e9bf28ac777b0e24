//! Severity
//!
//! Two closed enumerations: [`NativeSeverity`] is what the inventory backend reports,
//! [`Severity`] is what rows carry. [`map_severity`] is the only bridge between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alarm level as reported by the inventory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NativeSeverity {
    #[default]
    Undefined,
    Normal,
    Warning,
    Minor,
    Major,
    Critical,
    Information,
    Timeout,
    Initial,
    Masked,
    Error,
    Notice,
    Suggestion,
    /// Any code this build does not know about.
    #[serde(other)]
    Unrecognized,
}

/// Severity shown on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Timeout,
    Critical,
    Major,
    Minor,
    Warning,
    Normal,
    Notice,
    Information,
    Suggestion,
    #[default]
    Undefined,
}

impl Severity {
    pub const ALL: [Severity; 11] = [
        Severity::Error,
        Severity::Timeout,
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Warning,
        Severity::Normal,
        Severity::Notice,
        Severity::Information,
        Severity::Suggestion,
        Severity::Undefined,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Timeout => "Timeout",
            Severity::Critical => "Critical",
            Severity::Major => "Major",
            Severity::Minor => "Minor",
            Severity::Warning => "Warning",
            Severity::Normal => "Normal",
            Severity::Notice => "Notice",
            Severity::Information => "Information",
            Severity::Suggestion => "Suggestion",
            Severity::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a backend alarm level onto a row severity.
///
/// Total: levels without a named counterpart (initial, masked, unknown codes) become `Undefined`.
pub fn map_severity(native: NativeSeverity) -> Severity {
    match native {
        NativeSeverity::Error => Severity::Error,
        NativeSeverity::Timeout => Severity::Timeout,
        NativeSeverity::Critical => Severity::Critical,
        NativeSeverity::Major => Severity::Major,
        NativeSeverity::Minor => Severity::Minor,
        NativeSeverity::Warning => Severity::Warning,
        NativeSeverity::Normal => Severity::Normal,
        NativeSeverity::Notice => Severity::Notice,
        NativeSeverity::Information => Severity::Information,
        NativeSeverity::Suggestion => Severity::Suggestion,
        NativeSeverity::Undefined
        | NativeSeverity::Initial
        | NativeSeverity::Masked
        | NativeSeverity::Unrecognized => Severity::Undefined,
    }
}

impl From<NativeSeverity> for Severity {
    fn from(native: NativeSeverity) -> Self {
        map_severity(native)
    }
}
