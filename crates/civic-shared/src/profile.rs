//! Citizen profile data and its validation rules.
//!
//! The same rules run in the profile form before anything is sent and in the
//! server's profile endpoint before anything is written, so a profile that
//! passes one passes the other.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::PHONE_DIGITS;

/// Message for an email that does not look like `local@domain.tld`.
pub const INVALID_EMAIL: &str = "Please enter a valid email address";

/// Message for a phone number without exactly ten digits.
pub const INVALID_PHONE: &str = "Phone number must be 10 digits";

/// Editable profile fields of a citizen account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    District,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "firstName",
            ProfileField::LastName => "lastName",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Address => "address",
            ProfileField::City => "city",
            ProfileField::District => "district",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field error messages, ordered by field.
pub type FieldErrors = BTreeMap<ProfileField, String>;

impl CitizenProfile {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Address => &self.address,
            ProfileField::City => &self.city,
            ProfileField::District => self.district.as_deref().unwrap_or(""),
        }
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::FirstName => self.first_name = value,
            ProfileField::LastName => self.last_name = value,
            ProfileField::Email => self.email = value,
            ProfileField::Phone => self.phone = value,
            ProfileField::Address => self.address = value,
            ProfileField::City => self.city = value,
            ProfileField::District => {
                self.district = if value.is_empty() { None } else { Some(value) }
            }
        }
    }

    /// Validate every field and return the normalized profile.
    ///
    /// Normalization trims text fields, collapses an empty district to
    /// `None` and reduces the phone number to its digits.
    pub fn validate(&self) -> Result<CitizenProfile, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            errors.insert(ProfileField::FirstName, "First name is required".into());
        }

        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            errors.insert(ProfileField::LastName, "Last name is required".into());
        }

        let email = self.email.trim();
        if let Err(msg) = check_email(email) {
            errors.insert(ProfileField::Email, msg.into());
        }

        let phone = match check_phone(&self.phone) {
            Ok(digits) => digits,
            Err(msg) => {
                errors.insert(ProfileField::Phone, msg.into());
                String::new()
            }
        };

        let address = self.address.trim();
        if address.is_empty() {
            errors.insert(ProfileField::Address, "Address is required".into());
        }

        let city = self.city.trim();
        if city.is_empty() {
            errors.insert(ProfileField::City, "City is required".into());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let district = self
            .district
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);

        Ok(CitizenProfile {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone,
            address: address.to_string(),
            city: city.to_string(),
            district,
        })
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

/// Basic `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

fn check_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        Err("Email is required")
    } else if !is_valid_email(email) {
        Err(INVALID_EMAIL)
    } else {
        Ok(())
    }
}

/// Strip everything but digits and require exactly [`PHONE_DIGITS`] of them.
///
/// `"987-654-3210"`, `"(987) 654 3210"` and `"9876543210"` all normalize to
/// `"9876543210"`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == PHONE_DIGITS).then_some(digits)
}

fn check_phone(raw: &str) -> Result<String, &'static str> {
    if raw.trim().is_empty() {
        return Err("Phone number is required");
    }
    normalize_phone(raw).ok_or(INVALID_PHONE)
}
