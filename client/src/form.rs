//! Greeting form model and its validation rules

use std::fmt;

/// Longest accepted greeting, in UTF-16 code units.
pub const MAX_GREETING_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every rule violation of a form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// First message reported for `field`.
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Form fields. Only `greet` leaves the machine; name, age and address are
/// collected for the demo and never transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub name: String,
    pub age: Option<f64>,
    pub address: String,
    pub greet: String,
}

impl Default for UserInput {
    fn default() -> Self {
        Self {
            name: "Tester".to_string(),
            age: Some(18.0),
            address: "Blockstreet 20".to_string(),
            greet: "Hello World!".to_string(),
        }
    }
}

impl UserInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        if self.name.is_empty() {
            fail("name", "Name is required");
        }

        match self.age {
            Some(age) if !age.is_finite() => fail("age", "Age is required"),
            Some(age) if age <= 0.0 => fail("age", "Age must be a positive number"),
            Some(_) => {}
            None => fail("age", "Age is required"),
        }

        if self.address.is_empty() {
            fail("address", "Address is required");
        }

        if self.greet.is_empty() {
            fail("greet", "Greeting is required");
        } else if self.greet.encode_utf16().count() > MAX_GREETING_LENGTH {
            fail("greet", "Greeting must be less than 32 characters");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(UserInput::default().validate().is_ok());
    }

    #[test]
    fn test_greeting_length_limit() {
        let mut input = UserInput {
            greet: "g".repeat(32),
            ..Default::default()
        };
        assert!(input.validate().is_ok());

        input.greet.push('!');
        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.message_for("greet"),
            Some("Greeting must be less than 32 characters")
        );
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // 17 characters outside the BMP, two code units each
        let input = UserInput {
            greet: "\u{1F44B}".repeat(17),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_reports_every_field() {
        let input = UserInput {
            name: String::new(),
            age: Some(-3.0),
            address: String::new(),
            greet: String::new(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.0.len(), 4);
        assert_eq!(errors.message_for("name"), Some("Name is required"));
        assert_eq!(errors.message_for("age"), Some("Age must be a positive number"));
        assert_eq!(errors.message_for("address"), Some("Address is required"));
        assert_eq!(errors.message_for("greet"), Some("Greeting is required"));
    }

    #[test]
    fn test_missing_age() {
        let input = UserInput {
            age: None,
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().message_for("age"), Some("Age is required"));
    }
}
