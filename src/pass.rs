// 🚆 Local Pass - Passenger record → fixed-layout pass text
// One validation pass at entry, then pure formatting on typed data

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Returned by the string API for every rejected passenger
pub const INVALID_PASS: &str = "INVALID PASS";

/// First line of every pass
pub const PASS_TITLE: &str = "MUMBAI LOCAL PASS";

// ============================================================================
// CORE TYPES
// ============================================================================

/// Passenger record as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "classType")]
    pub class_type: String,
}

impl Passenger {
    pub fn new(name: &str, from: &str, to: &str, class_type: &str) -> Self {
        Passenger {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            class_type: class_type.to_string(),
        }
    }

    /// Shape check for untyped input
    ///
    /// The value must be an object whose `name`, `from`, `to` and
    /// `classType` members are all strings. Extra members are ignored.
    pub fn from_value(value: &Value) -> Result<Self, PassError> {
        let object = value
            .as_object()
            .ok_or_else(|| PassError::new("passenger", "expected an object"))?;

        let field = |key: &str| -> Result<String, PassError> {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| PassError::new(key, "missing or not a string"))
        };

        Ok(Passenger {
            name: field("name")?,
            from: field("from")?,
            to: field("to")?,
            class_type: field("classType")?,
        })
    }
}

/// Travel class printed on the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    First,
    Second,
}

impl ClassType {
    /// Case-insensitive parse; anything but first/second is rejected
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "first" => Some(ClassType::First),
            "second" => Some(ClassType::Second),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::First => "FIRST",
            ClassType::Second => "SECOND",
        }
    }

    /// Leading character of the pass ID
    pub fn initial(&self) -> char {
        match self {
            ClassType::First => 'F',
            ClassType::Second => 'S',
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassError {
    pub field: String,
    pub message: String,
}

impl PassError {
    fn new(field: &str, message: &str) -> Self {
        PassError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for PassError {}

// ============================================================================
// LOCAL PASS
// ============================================================================

/// Validated pass with every printed value already derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalPass {
    pub name: String,
    pub from: String,
    pub to: String,
    pub class_type: ClassType,
    pub pass_id: String,
}

impl LocalPass {
    /// Validate a passenger and derive the pass
    ///
    /// Checks, in order: non-blank `name`, `from`, `to`, then the class.
    /// The name is upper-cased as given (no trimming).
    pub fn issue(passenger: &Passenger) -> Result<Self, PassError> {
        require_text("name", &passenger.name)?;
        require_text("from", &passenger.from)?;
        require_text("to", &passenger.to)?;

        let class_type = ClassType::parse(&passenger.class_type)
            .ok_or_else(|| PassError::new("classType", "must be first or second"))?;

        Ok(LocalPass {
            name: passenger.name.to_uppercase(),
            from: title_case(&passenger.from),
            to: title_case(&passenger.to),
            class_type,
            pass_id: pass_id(class_type, &passenger.from, &passenger.to),
        })
    }

    /// Number of lines in the rendered pass
    pub const LINES: usize = 7;
}

impl fmt::Display for LocalPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n---\nName: {}\nFrom: {}\nTo: {}\nClass: {}\nPass ID: {}",
            PASS_TITLE,
            self.name,
            self.from,
            self.to,
            self.class_type.as_str(),
            self.pass_id
        )
    }
}

fn require_text(field: &str, value: &str) -> Result<(), PassError> {
    if value.trim().is_empty() {
        return Err(PassError::new(field, "must not be blank"));
    }
    Ok(())
}

/// Lower-case everything, then upper-case the first character
pub fn title_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class initial + up to 3 chars of each station, upper-cased, no padding
fn pass_id(class_type: ClassType, from: &str, to: &str) -> String {
    let mut id = String::new();
    id.push(class_type.initial());
    id.extend(from.to_uppercase().chars().take(3));
    id.extend(to.to_uppercase().chars().take(3));
    id
}

// ============================================================================
// STRING API
// ============================================================================

/// Format a passenger as a pass, or `INVALID PASS`
pub fn generate_local_pass(passenger: &Passenger) -> String {
    match LocalPass::issue(passenger) {
        Ok(pass) => pass.to_string(),
        Err(e) => {
            debug!(error = %e, "rejected passenger");
            INVALID_PASS.to_string()
        }
    }
}

/// Same as [`generate_local_pass`], for untyped input (null, arrays, etc.)
pub fn generate_local_pass_value(value: &Value) -> String {
    match Passenger::from_value(value) {
        Ok(passenger) => generate_local_pass(&passenger),
        Err(e) => {
            debug!(error = %e, "passenger has wrong shape");
            INVALID_PASS.to_string()
        }
    }
}
