//! Field rules the booking store validates incoming data against.
//!
//! Validation is schema driven and happens inside the store, right before the
//! write. A successful validation returns only the recognized fields; anything
//! else in the payload is dropped.

use crate::booking::BookingData;
use crate::error::Failure;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Accepted format for [`FieldType::Date`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Names the serialized [`Booking`](crate::booking::Booking) already uses for its metadata.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// The value type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A non-empty string.
    String,
    /// A positive integer.
    Integer,
    /// A calendar date in `YYYY-MM-DD` form.
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("a string"),
            Self::Integer => f.write_str("an integer"),
            Self::Date => f.write_str("a date in YYYY-MM-DD format"),
        }
    }
}

/// A single field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    name: String,
    field_type: FieldType,
    required: bool,
}

impl FieldRule {
    /// A field that must be present.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    /// A field that may be omitted or `null`.
    #[must_use]
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected value type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn check(&self, value: &Value) -> Option<SchemaViolation> {
        let field = self.name.clone();
        match self.field_type {
            FieldType::String => match value.as_str() {
                Some(s) if s.trim().is_empty() => Some(SchemaViolation::Empty { field }),
                Some(_) => None,
                None => Some(SchemaViolation::WrongType {
                    field,
                    expected: self.field_type,
                }),
            },
            FieldType::Integer => match value.as_i64() {
                Some(n) if n <= 0 => Some(SchemaViolation::NotPositive { field }),
                Some(_) => None,
                None => Some(SchemaViolation::WrongType {
                    field,
                    expected: self.field_type,
                }),
            },
            FieldType::Date => match value.as_str() {
                Some(s) if NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() => None,
                _ => Some(SchemaViolation::WrongType {
                    field,
                    expected: self.field_type,
                }),
            },
        }
    }
}

/// One violated field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// A required field is absent or `null`.
    #[error("{field} is required")]
    Missing {
        /// Field name.
        field: String,
    },

    /// The field carries a value of the wrong type.
    #[error("{field} must be {expected}")]
    WrongType {
        /// Field name.
        field: String,
        /// The type the rule expects.
        expected: FieldType,
    },

    /// A string field is blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name.
        field: String,
    },

    /// An integer field is zero or negative.
    #[error("{field} must be a positive integer")]
    NotPositive {
        /// Field name.
        field: String,
    },
}

/// Every violation found in one payload, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolations(Vec<SchemaViolation>);

impl SchemaViolations {
    /// The individual violations.
    #[must_use]
    pub fn violations(&self) -> &[SchemaViolation] {
        &self.0
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&details.join(", "))
    }
}

impl std::error::Error for SchemaViolations {}

impl From<SchemaViolations> for Failure {
    fn from(violations: SchemaViolations) -> Self {
        Self::validation(violations.to_string())
    }
}

/// Errors raised while building a [`BookingSchema`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A rule uses one of [`RESERVED_FIELDS`].
    #[error("{0} is reserved for booking metadata")]
    ReservedField(String),

    /// Two rules share a name.
    #[error("{0} has more than one rule")]
    DuplicateField(String),
}

/// The schema a booking store validates against.
///
/// # Examples
///
/// ```
/// use booking_core::schema::BookingSchema;
/// use serde_json::json;
///
/// let schema = BookingSchema::default();
/// let data = json!({ "customerName": "Alice", "roomId": 12, "date": "2024-05-01" });
/// let fields = schema.validate(data.as_object().unwrap_or(&Default::default()));
/// assert!(fields.is_ok());
///
/// let empty = schema.validate(&Default::default());
/// assert!(empty.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSchema {
    rules: Vec<FieldRule>,
}

impl BookingSchema {
    /// Build a schema from explicit rules.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a rule is named after booking metadata or two
    /// rules share a name.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, SchemaError> {
        for (index, rule) in rules.iter().enumerate() {
            if RESERVED_FIELDS.contains(&rule.name()) {
                return Err(SchemaError::ReservedField(rule.name().to_string()));
            }
            if rules[..index].iter().any(|other| other.name() == rule.name()) {
                return Err(SchemaError::DuplicateField(rule.name().to_string()));
            }
        }
        Ok(Self { rules })
    }

    /// The rules, in validation order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Validate `data` and return only the recognized fields.
    ///
    /// Optional fields that are `null` are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns every [`SchemaViolation`] found when at least one rule fails.
    pub fn validate(&self, data: &BookingData) -> Result<BookingData, SchemaViolations> {
        let mut recognized = BookingData::new();
        let mut violations = Vec::new();

        for rule in &self.rules {
            match data.get(rule.name()).filter(|value| !value.is_null()) {
                None if rule.is_required() => violations.push(SchemaViolation::Missing {
                    field: rule.name().to_string(),
                }),
                None => {},
                Some(value) => match rule.check(value) {
                    Some(violation) => violations.push(violation),
                    None => {
                        recognized.insert(rule.name().to_string(), value.clone());
                    },
                },
            }
        }

        if violations.is_empty() {
            Ok(recognized)
        } else {
            Err(SchemaViolations(violations))
        }
    }

    /// Check only the fields present in `patch`.
    ///
    /// A `null` removes a field, so it is rejected for required fields and accepted
    /// for optional ones. Absent fields are not checked.
    ///
    /// # Errors
    ///
    /// Returns every [`SchemaViolation`] found in the supplied fields.
    pub fn validate_partial(&self, patch: &BookingData) -> Result<(), SchemaViolations> {
        let violations: Vec<SchemaViolation> = self
            .rules
            .iter()
            .filter_map(|rule| match patch.get(rule.name()) {
                None => None,
                Some(Value::Null) if rule.is_required() => Some(SchemaViolation::Missing {
                    field: rule.name().to_string(),
                }),
                Some(Value::Null) => None,
                Some(value) => rule.check(value),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolations(violations))
        }
    }
}

impl Default for BookingSchema {
    fn default() -> Self {
        Self {
            rules: vec![
                FieldRule::required("customerName", FieldType::String),
                FieldRule::required("roomId", FieldType::Integer),
                FieldRule::required("date", FieldType::Date),
                FieldRule::optional("notes", FieldType::String),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use proptest::prelude::*;
    use serde_json::json;

    fn data(value: Value) -> BookingData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn metadata_names_cannot_be_rules() {
        for reserved in RESERVED_FIELDS {
            let err = BookingSchema::new(vec![
                FieldRule::required("customerName", FieldType::String),
                FieldRule::optional(reserved, FieldType::String),
            ])
            .unwrap_err();
            assert_eq!(err, SchemaError::ReservedField(reserved.to_string()));
        }
    }

    #[test]
    fn duplicate_rules_are_rejected() {
        let err = BookingSchema::new(vec![
            FieldRule::required("roomId", FieldType::Integer),
            FieldRule::optional("roomId", FieldType::String),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "roomId has more than one rule");
    }

    #[test]
    fn custom_schema_keeps_rule_order() {
        let schema = BookingSchema::new(vec![
            FieldRule::required("guest", FieldType::String),
            FieldRule::optional("nights", FieldType::Integer),
        ])
        .unwrap();
        let names: Vec<&str> = schema.rules().iter().map(FieldRule::name).collect();
        assert_eq!(names, ["guest", "nights"]);
    }

    #[test]
    fn valid_booking_passes() {
        let fields = BookingSchema::default()
            .validate(&data(json!({
                "customerName": "Alice",
                "roomId": 12,
                "date": "2024-05-01",
            })))
            .unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["customerName"], "Alice");
    }

    #[test]
    fn empty_payload_reports_every_required_field() {
        let err = BookingSchema::default().validate(&BookingData::new()).unwrap_err();
        assert_eq!(err.violations().len(), 3);
        assert_eq!(
            err.to_string(),
            "customerName is required, roomId is required, date is required"
        );
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let fields = BookingSchema::default()
            .validate(&data(json!({
                "customerName": "Alice",
                "roomId": 1,
                "date": "2024-05-01",
                "admin": true,
            })))
            .unwrap();
        assert!(!fields.contains_key("admin"));
    }

    #[test]
    fn optional_null_is_absent() {
        let fields = BookingSchema::default()
            .validate(&data(json!({
                "customerName": "Alice",
                "roomId": 1,
                "date": "2024-05-01",
                "notes": null,
            })))
            .unwrap();
        assert!(!fields.contains_key("notes"));
    }

    #[test]
    fn type_errors_are_reported() {
        let err = BookingSchema::default()
            .validate(&data(json!({
                "customerName": "",
                "roomId": -3,
                "date": "01/05/2024",
                "notes": 7,
            })))
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                SchemaViolation::Empty {
                    field: "customerName".into()
                },
                SchemaViolation::NotPositive {
                    field: "roomId".into()
                },
                SchemaViolation::WrongType {
                    field: "date".into(),
                    expected: FieldType::Date
                },
                SchemaViolation::WrongType {
                    field: "notes".into(),
                    expected: FieldType::String
                },
            ]
        );
    }

    #[test]
    fn partial_checks_only_supplied_fields() {
        let schema = BookingSchema::default();
        assert!(schema.validate_partial(&data(json!({ "notes": "window seat" }))).is_ok());
        assert!(schema.validate_partial(&data(json!({ "notes": null }))).is_ok());

        let err = schema
            .validate_partial(&data(json!({ "roomId": "twelve", "date": null })))
            .unwrap_err();
        assert_eq!(err.to_string(), "roomId must be an integer, date is required");
    }

    #[test]
    fn violations_become_validation_failures() {
        let err = BookingSchema::default().validate(&BookingData::new()).unwrap_err();
        let failure = Failure::from(err);
        assert_eq!(failure.kind(), FailureKind::Validation);
        assert!(failure.explanation().contains("roomId is required"));
    }

    proptest! {
        #[test]
        fn recognized_fields_survive_validation(
            name in "[A-Za-z][A-Za-z ]{0,30}",
            room in 1_i64..100_000,
            day in 1_u32..=28,
            month in 1_u32..=12,
            year in 2000_i32..2100,
            extra in "[a-z]{1,8}",
        ) {
            let date = format!("{year:04}-{month:02}-{day:02}");
            let mut input = data(json!({
                "customerName": name,
                "roomId": room,
                "date": date,
            }));
            input.insert(format!("x_{extra}"), json!("ignored"));

            let fields = BookingSchema::default().validate(&input).unwrap();
            prop_assert_eq!(fields.len(), 3);
            prop_assert_eq!(&fields["customerName"], &input["customerName"]);
            prop_assert_eq!(&fields["roomId"], &input["roomId"]);
            prop_assert_eq!(&fields["date"], &input["date"]);
        }

        #[test]
        fn non_positive_rooms_are_rejected(room in i64::MIN..=0) {
            let input = data(json!({
                "customerName": "Alice",
                "roomId": room,
                "date": "2024-05-01",
            }));
            prop_assert!(BookingSchema::default().validate(&input).is_err());
        }
    }
}
