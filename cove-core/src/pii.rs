use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Guest contact details wrapped so they cannot leak through `Debug`.
///
/// Orders, intents and log events all carry emails and phone numbers;
/// formatting any containing struct with `{:?}` prints `[redacted]` in
/// their place. Serde stays transparent because API clients and the
/// mailer need the real value.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T: PartialEq> PartialEq for Masked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_masked() {
        let email = Masked("guest@example.com".to_string());
        assert_eq!(format!("{:?}", email), "[redacted]");
        assert_eq!(format!("{}", email), "[redacted]");
    }

    #[test]
    fn masking_survives_nested_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Contact {
            email: Masked<String>,
        }
        let contact = Contact { email: Masked("guest@example.com".to_string()) };
        assert!(!format!("{:?}", contact).contains("guest@example.com"));
    }

    #[test]
    fn serialization_exposes_inner_value() {
        let email = Masked("guest@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"guest@example.com\"");
    }
}
