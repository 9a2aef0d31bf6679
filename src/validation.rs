//! Argument validation for text commands: character names, amounts, quantities.

use std::collections::HashSet;

use crate::roleplay::types::Account;

/// Character name validation errors with helpful messages
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Name is reserved")]
    Reserved,
}

/// Command argument errors. Display text is shown to the player as-is.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Invalid amount specified.")]
    InvalidAmount,

    #[error("Invalid quantity specified.")]
    InvalidQuantity,

    #[error("Invalid grade specified.")]
    InvalidGrade,

    #[error("Invalid value '{0}'.")]
    InvalidNumber(String),

    #[error("Unknown account '{0}' (use cash, bank or black_money).")]
    UnknownAccount(String),
}

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 32;

fn reserved_names() -> HashSet<&'static str> {
    ["admin", "console", "server", "system", "nobody"]
        .iter()
        .copied()
        .collect()
}

/// Command arguments cannot contain spaces, so `_` stands in for one.
pub fn fix_name(raw: &str) -> String {
    raw.replace('_', " ")
}

/// Validate a display name for a new character. Returns the trimmed name.
pub fn validate_character_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();
    if length < NAME_MIN_LENGTH {
        return Err(NameError::TooShort {
            min: NAME_MIN_LENGTH,
        });
    }
    if length > NAME_MAX_LENGTH {
        return Err(NameError::TooLong {
            max: NAME_MAX_LENGTH,
        });
    }
    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(NameError::Reserved);
    }

    let invalid: HashSet<char> = trimmed
        .chars()
        .filter(|&c| !(c.is_alphanumeric() || c == ' ' || c == '-' || c == '\''))
        .collect();
    if !invalid.is_empty() {
        let mut chars: Vec<char> = invalid.into_iter().collect();
        chars.sort_unstable();
        return Err(NameError::InvalidCharacters {
            chars: chars.into_iter().collect(),
        });
    }
    Ok(trimmed.to_string())
}

/// Money amounts: integers greater than zero.
pub fn parse_positive_amount(raw: &str) -> Result<i64, ArgumentError> {
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ArgumentError::InvalidAmount),
    }
}

pub fn parse_quantity(raw: &str) -> Result<u32, ArgumentError> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ArgumentError::InvalidQuantity),
    }
}

pub fn parse_grade(raw: &str) -> Result<u32, ArgumentError> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ArgumentError::InvalidGrade),
    }
}

/// Signed delta such as a food value; `-1` is meaningful to callers.
pub fn parse_delta(raw: &str) -> Result<i32, ArgumentError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ArgumentError::InvalidNumber(raw.to_string()))
}

pub fn parse_account(raw: &str) -> Result<Account, ArgumentError> {
    raw.parse::<Account>()
        .map_err(|_| ArgumentError::UnknownAccount(raw.to_string()))
}
