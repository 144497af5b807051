use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Body style of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "car_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CarCategory {
    Sedan,
    Suv,
    Hatchback,
    Convertible,
    Truck,
    Other,
}

impl CarCategory {
    pub const ALL: [CarCategory; 6] = [
        CarCategory::Sedan,
        CarCategory::Suv,
        CarCategory::Hatchback,
        CarCategory::Convertible,
        CarCategory::Truck,
        CarCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarCategory::Sedan => "sedan",
            CarCategory::Suv => "suv",
            CarCategory::Hatchback => "hatchback",
            CarCategory::Convertible => "convertible",
            CarCategory::Truck => "truck",
            CarCategory::Other => "other",
        }
    }
}

impl fmt::Display for CarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CarCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category '{}'", s))
    }
}

/// Car record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub category: CarCategory,
    pub color: String,
    pub model: String,
    pub make: String,
    pub registration_no: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated car fields for insert or full replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub category: CarCategory,
    pub color: String,
    pub model: String,
    pub make: String,
    pub registration_no: String,
}

/// Request body for creating or replacing a car
///
/// Missing fields deserialize as empty strings so that they are reported by
/// validation rather than rejected by the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    #[serde(default)]
    #[validate(custom = "validate_category")]
    pub category: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Color is required"))]
    pub color: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Registration number is required"))]
    pub registration_no: String,
}

impl CarPayload {
    /// Trim every field so blank values fail validation
    pub fn normalized(self) -> Self {
        Self {
            category: self.category.trim().to_lowercase(),
            color: self.color.trim().to_string(),
            model: self.model.trim().to_string(),
            make: self.make.trim().to_string(),
            registration_no: self.registration_no.trim().to_string(),
        }
    }

    /// Normalize, validate and convert into [`NewCar`]
    pub fn into_new_car(self) -> Result<NewCar, validator::ValidationErrors> {
        let payload = self.normalized();
        payload.validate()?;

        let category = payload.category.parse().map_err(|_| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("category", category_error());
            errors
        })?;

        Ok(NewCar {
            category,
            color: payload.color,
            model: payload.model,
            make: payload.make,
            registration_no: payload.registration_no,
        })
    }
}

fn category_error() -> ValidationError {
    let mut error = ValidationError::new("category");
    error.message = Some(Cow::from(
        "Category is required and must be one of: sedan, suv, hatchback, convertible, truck, other",
    ));
    error
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    category
        .parse::<CarCategory>()
        .map(|_| ())
        .map_err(|_| category_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CarPayload {
        CarPayload {
            category: "SUV".to_string(),
            color: " red ".to_string(),
            model: "Model Y".to_string(),
            make: "Tesla".to_string(),
            registration_no: "ABC-123".to_string(),
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("sedan".parse::<CarCategory>().unwrap(), CarCategory::Sedan);
        assert_eq!(" Truck ".parse::<CarCategory>().unwrap(), CarCategory::Truck);
        assert!("spaceship".parse::<CarCategory>().is_err());
    }

    #[test]
    fn test_valid_payload() {
        let car = payload().into_new_car().unwrap();
        assert_eq!(car.category, CarCategory::Suv);
        assert_eq!(car.color, "red");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let errors = CarPayload::default().into_new_car().unwrap_err();
        let fields = errors.field_errors();

        for field in ["category", "color", "model", "make", "registration_no"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let errors = CarPayload {
            make: "   ".to_string(),
            ..payload()
        }
        .into_new_car()
        .unwrap_err();

        assert!(errors.field_errors().contains_key("make"));
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let errors = CarPayload {
            category: "spaceship".to_string(),
            ..payload()
        }
        .into_new_car()
        .unwrap_err();

        assert!(errors.field_errors().contains_key("category"));
    }

    #[test]
    fn test_car_json_uses_camel_case() {
        let body: CarPayload = serde_json::from_str(
            r#"{"category":"sedan","color":"blue","model":"Civic","make":"Honda","registrationNo":"XYZ-1"}"#,
        )
        .unwrap();
        assert_eq!(body.registration_no, "XYZ-1");
    }
}
