//! Small value types shared across layers.
//!
//! Stored as plain strings in the database; parsed at the edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::Validation("Invalid role".to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shelf state of a book in a user's reading list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    WantToRead,
    Reading,
    Completed,
    Paused,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Completed => "completed",
            ReadingStatus::Paused => "paused",
        }
    }
}

impl FromStr for ReadingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(ReadingStatus::WantToRead),
            "reading" => Ok(ReadingStatus::Reading),
            "completed" => Ok(ReadingStatus::Completed),
            "paused" => Ok(ReadingStatus::Paused),
            other => Err(DomainError::Validation(format!(
                "Invalid reading status: {}",
                other
            ))),
        }
    }
}

/// Rejects a rating outside [0, 5].
pub fn validate_rating(rating: f64) -> Result<(), DomainError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(DomainError::Validation(
            "Rating must be between 0 and 5".to_string(),
        ));
    }
    Ok(())
}

/// Rejects reading progress outside [0, 100].
pub fn validate_percent(progress: i32) -> Result<(), DomainError> {
    if !(0..=100).contains(&progress) {
        return Err(DomainError::Validation(
            "Progress must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn reading_status_round_trips_through_str() {
        for status in [
            ReadingStatus::WantToRead,
            ReadingStatus::Reading,
            ReadingStatus::Completed,
            ReadingStatus::Paused,
        ] {
            assert_eq!(status.as_str().parse::<ReadingStatus>(), Ok(status));
        }
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.5).is_err());
        assert!(validate_rating(-0.1).is_err());
    }
}
