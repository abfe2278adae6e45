//! Error codes for the roster diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Reader errors
//! - `E1xx` - Field errors
//! - `E2xx` - Cross-row validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Reader Errors (E0xx)
    // =========================================================================
    /// Malformed CSV.
    ///
    /// The CSV reader rejected the input, e.g. a record with the wrong
    /// number of fields or invalid UTF-8.
    E001,

    /// Malformed JSON.
    E002,

    /// Unexpected JSON shape.
    ///
    /// The document must be an array of objects, one object per member.
    E003,

    /// Unsupported JSON value.
    ///
    /// Field values must be strings, numbers, booleans or null.
    E004,

    // =========================================================================
    // Field Errors (E1xx)
    // =========================================================================
    /// Missing required field.
    E100,

    /// Invalid semester.
    ///
    /// Semesters look like `Fall 2010`, `Spring 2011`, `Fa10` or `S2011`.
    E101,

    /// Invalid affiliation list.
    ///
    /// Affiliations are a chapter name followed by a number, separated by
    /// `,`, `;` or `/`: `Virginia Alpha 12, Virginia Beta 3`.
    E102,

    /// Unrecognized yes/no value.
    ///
    /// Reported as a warning; the value is read as `no`.
    E103,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Unknown big.
    ///
    /// The big column names nobody on the roster.
    E200,

    /// Ambiguous big.
    ///
    /// The big column matches more than one member.
    E201,

    /// Repeated chapter.
    ///
    /// A member lists two affiliations with the same chapter.
    E202,

    /// Duplicate designation.
    ///
    /// Two members hold the same chapter designation.
    E203,
}

impl ErrorCode {
    /// Returns a short description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed CSV",
            ErrorCode::E002 => "malformed JSON",
            ErrorCode::E003 => "unexpected JSON shape",
            ErrorCode::E004 => "unsupported JSON value",
            ErrorCode::E100 => "missing required field",
            ErrorCode::E101 => "invalid semester",
            ErrorCode::E102 => "invalid affiliation list",
            ErrorCode::E103 => "unrecognized yes/no value",
            ErrorCode::E200 => "unknown big",
            ErrorCode::E201 => "ambiguous big",
            ErrorCode::E202 => "repeated chapter",
            ErrorCode::E203 => "duplicate designation",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
