//! Checkout form validation.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::catalog::ProductVariation;
use super::errors::{DomainError, ValidationErrors};
use super::order::{CustomerDetails, PaymentMethod, SelectedVariation};
use super::pricing::MAX_QUANTITY;
use super::settings::StoreSettings;

/// Attribute name → chosen variation id.
pub type VariationSelection = BTreeMap<String, Uuid>;

#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub thana: String,
    pub district: String,
    pub delivery_location: String,
    pub quantity: i32,
    pub variations: VariationSelection,
    pub payment_method: String,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidCheckout {
    pub customer: CustomerDetails,
    pub quantity: i32,
    pub selected: Vec<ProductVariation>,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
}

impl From<&ProductVariation> for SelectedVariation {
    fn from(v: &ProductVariation) -> Self {
        SelectedVariation {
            attribute: v.name.clone(),
            variation_id: v.id,
            value: v.value.clone(),
            price_adjustment: v.price_adjustment.clone(),
        }
    }
}

/// Exactly 11 ASCII digits with a leading `0`, e.g. `01712345678`.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11 && phone.starts_with('0') && phone.bytes().all(|b| b.is_ascii_digit())
}

/// "<location>, <thana>, <district>", skipping blank parts.
pub fn compose_address(delivery_location: &str, thana: &str, district: &str) -> String {
    [delivery_location, thana, district]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn required(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
}

/// Resolve each attribute → id pair against the product's variations. Every
/// id must belong to the product, be active, and carry the named attribute.
pub fn resolve_variations(
    available: &[ProductVariation],
    selection: &VariationSelection,
) -> Result<Vec<ProductVariation>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut chosen = Vec::with_capacity(selection.len());
    for (attribute, id) in selection {
        match available.iter().find(|v| v.id == *id) {
            Some(v) if v.is_active && v.name.eq_ignore_ascii_case(attribute) => {
                chosen.push(v.clone())
            }
            Some(v) if !v.is_active => {
                errors.add(format!("variations.{attribute}"), "is no longer available")
            }
            _ => errors.add(
                format!("variations.{attribute}"),
                "is not a valid option for this product",
            ),
        }
    }
    if errors.is_empty() {
        Ok(chosen)
    } else {
        Err(errors)
    }
}

/// Parse the payment method and apply the transaction-id rule. With
/// `settings`, the method must also be enabled for the store.
pub fn validate_payment(
    errors: &mut ValidationErrors,
    method: &str,
    transaction_id: Option<&str>,
    settings: Option<&StoreSettings>,
) -> (Option<PaymentMethod>, Option<String>) {
    let payment_method = match method.trim().parse::<PaymentMethod>() {
        Ok(method) if settings.map_or(true, |s| s.payment_enabled(method)) => Some(method),
        Ok(_) => {
            errors.add("payment_method", "is not accepted by this store");
            None
        }
        Err(_) => {
            errors.add("payment_method", "must be one of cod, bkash, nagad");
            None
        }
    };

    let transaction_id = transaction_id
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let transaction_id = match payment_method {
        Some(method) if method.requires_transaction_id() => {
            match &transaction_id {
                None => errors.add(
                    "transaction_id",
                    format!("is required when paying with {method}"),
                ),
                Some(t) if t.len() > 100 => {
                    errors.add("transaction_id", "must be at most 100 characters")
                }
                Some(_) => {}
            }
            transaction_id
        }
        // Cash on delivery never carries a transaction id.
        _ => None,
    };
    (payment_method, transaction_id)
}

/// Name, phone (at most 20 characters, no format check) and address for
/// orders keyed in by staff or API clients.
pub fn validate_customer(errors: &mut ValidationErrors, customer: &CustomerDetails) {
    required(errors, "customer_name", &customer.name, 255);
    required(errors, "customer_phone", &customer.phone, 20);
    required(errors, "customer_address", &customer.address, 500);
}

impl CheckoutForm {
    pub fn validate(
        &self,
        variations: &[ProductVariation],
        settings: &StoreSettings,
    ) -> Result<ValidCheckout, DomainError> {
        let mut errors = ValidationErrors::new();

        required(&mut errors, "customer_name", &self.customer_name, 255);
        let phone = self.customer_phone.trim();
        if phone.is_empty() {
            errors.add("customer_phone", "is required");
        } else if !is_valid_phone(phone) {
            errors.add(
                "customer_phone",
                "must be 11 digits starting with 0 (e.g. 01712345678)",
            );
        }
        required(&mut errors, "thana", &self.thana, 100);
        required(&mut errors, "district", &self.district, 100);
        required(&mut errors, "delivery_location", &self.delivery_location, 255);
        if self.quantity < 1 {
            errors.add("quantity", "must be at least 1");
        } else if self.quantity > MAX_QUANTITY {
            errors.add("quantity", format!("must be at most {MAX_QUANTITY}"));
        }

        let (payment_method, transaction_id) = validate_payment(
            &mut errors,
            &self.payment_method,
            self.transaction_id.as_deref(),
            Some(settings),
        );

        let selected = match resolve_variations(variations, &self.variations) {
            Ok(selected) => selected,
            Err(variation_errors) => {
                for (field, message) in variation_errors.iter() {
                    errors.add(field, message);
                }
                Vec::new()
            }
        };

        errors.into_result()?;
        let payment_method = payment_method.ok_or_else(|| {
            DomainError::Internal("payment method missing after validation".to_string())
        })?;

        Ok(ValidCheckout {
            customer: CustomerDetails {
                name: self.customer_name.trim().to_string(),
                phone: phone.to_string(),
                address: compose_address(&self.delivery_location, &self.thana, &self.district),
            },
            quantity: self.quantity,
            selected,
            payment_method,
            transaction_id,
        })
    }
}
