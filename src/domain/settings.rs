use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::{DomainError, ValidationErrors};
use super::order::PaymentMethod;

/// Store configuration. Persisted as key/value rows, used as one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub store_name: String,
    pub store_description: String,
    pub support_email: String,
    pub support_phone: String,
    pub logo: String,
    pub offer_title: String,
    pub offer_countdown_text: String,
    pub cod_enabled: bool,
    pub bkash_enabled: bool,
    pub nagad_enabled: bool,
    pub bkash_number: String,
    pub bkash_instructions: String,
    pub nagad_number: String,
    pub nagad_instructions: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Happy Shopping".to_string(),
            store_description: "Your fashion destination".to_string(),
            support_email: String::new(),
            support_phone: String::new(),
            logo: String::new(),
            offer_title: String::new(),
            offer_countdown_text: "Ends In".to_string(),
            cod_enabled: true,
            bkash_enabled: false,
            nagad_enabled: false,
            bkash_number: String::new(),
            bkash_instructions: String::new(),
            nagad_number: String::new(),
            nagad_instructions: String::new(),
        }
    }
}

/// Subset shown on every public page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicSettings {
    pub store_name: String,
    pub logo: String,
    pub support_email: String,
    pub support_phone: String,
    pub cod_enabled: bool,
    pub bkash_enabled: bool,
    pub nagad_enabled: bool,
    pub bkash_number: String,
    pub nagad_number: String,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

impl StoreSettings {
    /// Build from stored rows; missing keys and unparsable flags keep their
    /// defaults, unknown keys are ignored.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let mut settings = Self::default();
        let text = |key: &str, slot: &mut String| {
            if let Some(value) = pairs.get(key) {
                *slot = value.clone();
            }
        };
        text("store_name", &mut settings.store_name);
        text("store_description", &mut settings.store_description);
        text("support_email", &mut settings.support_email);
        text("support_phone", &mut settings.support_phone);
        text("logo", &mut settings.logo);
        text("offer_title", &mut settings.offer_title);
        text("offer_countdown_text", &mut settings.offer_countdown_text);
        text("bkash_number", &mut settings.bkash_number);
        text("bkash_instructions", &mut settings.bkash_instructions);
        text("nagad_number", &mut settings.nagad_number);
        text("nagad_instructions", &mut settings.nagad_instructions);

        let flag = |key: &str, slot: &mut bool| {
            if let Some(value) = pairs.get(key).and_then(|raw| parse_flag(raw)) {
                *slot = value;
            }
        };
        flag("cod_enabled", &mut settings.cod_enabled);
        flag("bkash_enabled", &mut settings.bkash_enabled);
        flag("nagad_enabled", &mut settings.nagad_enabled);
        settings
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("store_name", self.store_name.clone()),
            ("store_description", self.store_description.clone()),
            ("support_email", self.support_email.clone()),
            ("support_phone", self.support_phone.clone()),
            ("logo", self.logo.clone()),
            ("offer_title", self.offer_title.clone()),
            ("offer_countdown_text", self.offer_countdown_text.clone()),
            ("cod_enabled", self.cod_enabled.to_string()),
            ("bkash_enabled", self.bkash_enabled.to_string()),
            ("nagad_enabled", self.nagad_enabled.to_string()),
            ("bkash_number", self.bkash_number.clone()),
            ("bkash_instructions", self.bkash_instructions.clone()),
            ("nagad_number", self.nagad_number.clone()),
            ("nagad_instructions", self.nagad_instructions.clone()),
        ]
    }

    pub fn payment_enabled(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Cod => self.cod_enabled,
            PaymentMethod::Bkash => self.bkash_enabled,
            PaymentMethod::Nagad => self.nagad_enabled,
        }
    }

    pub fn public(&self) -> PublicSettings {
        PublicSettings {
            store_name: self.store_name.clone(),
            logo: self.logo.clone(),
            support_email: self.support_email.clone(),
            support_phone: self.support_phone.clone(),
            cod_enabled: self.cod_enabled,
            bkash_enabled: self.bkash_enabled,
            nagad_enabled: self.nagad_enabled,
            bkash_number: self.bkash_number.clone(),
            nagad_number: self.nagad_number.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if self.store_name.trim().is_empty() {
            errors.add("store_name", "is required");
        } else if self.store_name.chars().count() > 255 {
            errors.add("store_name", "must be at most 255 characters");
        }
        if !self.support_email.is_empty() && !self.support_email.contains('@') {
            errors.add("support_email", "must be a valid email address");
        }
        if self.support_phone.chars().count() > 20 {
            errors.add("support_phone", "must be at most 20 characters");
        }
        if self.offer_title.chars().count() > 500 {
            errors.add("offer_title", "must be at most 500 characters");
        }
        if self.offer_countdown_text.chars().count() > 100 {
            errors.add("offer_countdown_text", "must be at most 100 characters");
        }
        for (field, number) in [
            ("bkash_number", &self.bkash_number),
            ("nagad_number", &self.nagad_number),
        ] {
            if number.chars().count() > 20 {
                errors.add(field, "must be at most 20 characters");
            }
        }
        if !(self.cod_enabled || self.bkash_enabled || self.nagad_enabled) {
            errors.add("cod_enabled", "at least one payment method must be enabled");
        }
        errors.into_result()
    }
}
