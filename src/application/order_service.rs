use std::collections::BTreeSet;

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::catalog::{Page, ProductVariation};
use crate::domain::checkout::{
    compose_address, resolve_variations, validate_customer, validate_payment, CheckoutForm,
    VariationSelection,
};
use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::invoice::InvoiceView;
use crate::domain::order::{
    BulkStatusOutcome, CustomerDetails, IncompleteDraft, LineDraft, OrderCounts, OrderDraft,
    OrderNumberKind, OrderScope, OrderStatus, OrderUpdate, OrderView, PlacedOrder,
    SelectedVariation,
};
use crate::domain::ports::{CatalogRepository, OrderRepository};
use crate::domain::pricing;
use crate::domain::report;
use crate::domain::settings::StoreSettings;
use crate::domain::user::User;

/// Attempts at placing an order before a clashing order number is reported.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Priced from the catalog when absent.
    pub unit_price: Option<BigDecimal>,
    pub variations: VariationSelection,
}

/// Multi-item order keyed in by staff or an API client.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub customer: CustomerDetails,
    pub status: Option<OrderStatus>,
    /// Staff may fix the total; otherwise it is the sum of the line totals.
    pub total: Option<BigDecimal>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub items: Vec<OrderLineInput>,
    pub issue_invoice: bool,
}

/// Partial checkout form sent while the shopper is still typing.
#[derive(Debug, Clone, Default)]
pub struct IncompleteCapture {
    pub product_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub thana: Option<String>,
    pub district: Option<String>,
    pub delivery_location: Option<String>,
    pub quantity: Option<i32>,
    pub variations: VariationSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Admin,
    Api,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

pub struct OrderService<C, O> {
    catalog: C,
    orders: O,
}

impl<C: CatalogRepository, O: OrderRepository> OrderService<C, O> {
    pub fn new(catalog: C, orders: O) -> Self {
        Self { catalog, orders }
    }

    /// Persist `draft` under a fresh order number, retrying when the number
    /// is already taken.
    fn place(&self, mut draft: OrderDraft) -> Result<PlacedOrder, DomainError> {
        let mut attempt = 1;
        loop {
            draft.order_number = OrderNumberKind::Placed.generate();
            match self.orders.place(&draft) {
                Err(DomainError::Conflict(reason)) if attempt < MAX_PLACEMENT_ATTEMPTS => {
                    log::warn!(
                        "Order number {} clashed ({reason}), retrying",
                        draft.order_number
                    );
                    attempt += 1;
                }
                Ok(placed) => {
                    log::info!(
                        "Order {} placed ({} item(s), total {}, status {})",
                        placed.order_number,
                        draft.items.len(),
                        draft.total,
                        draft.status
                    );
                    if let Some(invoice) = &placed.invoice_number {
                        log::info!("Invoice {invoice} issued for {}", placed.order_number);
                    }
                    return Ok(placed);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Storefront single-product checkout. `customer` is the shopper
    /// identified by API key, whose profile then takes the submitted details.
    pub fn checkout(
        &self,
        slug: &str,
        form: &CheckoutForm,
        customer: Option<&User>,
        settings: &StoreSettings,
    ) -> Result<PlacedOrder, DomainError> {
        let detail = self
            .catalog
            .find_product_by_slug(slug)?
            .filter(|d| d.product.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        let valid = form.validate(&detail.variations, settings)?;

        let selected: Vec<&ProductVariation> = valid.selected.iter().collect();
        let quote = pricing::quote(&detail.product, &selected, valid.quantity);
        if !pricing::is_storable_amount(&quote.line_total) {
            return Err(
                ValidationErrors::single("quantity", "makes the order total too large").into(),
            );
        }

        self.place(OrderDraft {
            order_number: String::new(),
            user_id: customer.map(|u| u.id),
            customer: valid.customer,
            status: OrderStatus::Pending,
            total: quote.line_total,
            payment_method: Some(valid.payment_method),
            transaction_id: valid.transaction_id,
            items: vec![LineDraft {
                product_id: detail.product.id,
                product_name: detail.product.name.clone(),
                quantity: valid.quantity,
                unit_price: quote.unit_price,
                variations: valid.selected.iter().map(SelectedVariation::from).collect(),
            }],
            issue_invoice: true,
            update_profile: customer.is_some(),
        })
    }

    pub fn place_admin(&self, request: OrderRequest) -> Result<PlacedOrder, DomainError> {
        let draft = self.prepare(request, Channel::Admin, None)?;
        self.place(draft)
    }

    /// API orders start as pending, are priced from the catalog and always
    /// get an invoice.
    pub fn place_api(&self, request: OrderRequest, user: &User) -> Result<PlacedOrder, DomainError> {
        let draft = self.prepare(request, Channel::Api, Some(user.id))?;
        self.place(draft)
    }

    fn prepare(
        &self,
        request: OrderRequest,
        channel: Channel,
        user_id: Option<Uuid>,
    ) -> Result<OrderDraft, DomainError> {
        let mut errors = ValidationErrors::new();
        validate_customer(&mut errors, &request.customer);

        let status = match channel {
            Channel::Admin => request.status.unwrap_or(OrderStatus::Pending),
            Channel::Api => OrderStatus::Pending,
        };
        if status == OrderStatus::Incomplete {
            errors.add("status", "cannot place an order as incomplete");
        }

        let (payment_method, transaction_id) = match (channel, non_blank(&request.payment_method)) {
            (Channel::Admin, None) => (None, None),
            (_, method) => validate_payment(
                &mut errors,
                method.unwrap_or_default(),
                request.transaction_id.as_deref(),
                None,
            ),
        };

        if request.items.is_empty() {
            errors.add("items", "must contain at least one item");
        }
        let mut lines = Vec::with_capacity(request.items.len());
        let mut line_totals = Vec::with_capacity(request.items.len());
        for (i, item) in request.items.iter().enumerate() {
            if let Some((line, total)) = self.price_line(i, item, channel, &mut errors)? {
                lines.push(line);
                line_totals.push(total);
            }
        }

        let computed = pricing::order_total(&line_totals);
        let total = match (channel, request.total) {
            (Channel::Admin, Some(total)) => {
                if !pricing::is_storable_amount(&total) {
                    errors.add("total", "is too large or has more than two decimal places");
                    BigDecimal::zero()
                } else {
                    if total < BigDecimal::zero() {
                        errors.add("total", "must not be negative");
                    }
                    pricing::round_money(&total)
                }
            }
            _ => {
                if !pricing::is_storable_amount(&computed) {
                    errors.add("total", "is too large");
                }
                computed
            }
        };
        errors.into_result()?;

        Ok(OrderDraft {
            order_number: String::new(),
            user_id,
            customer: CustomerDetails {
                name: request.customer.name.trim().to_string(),
                phone: request.customer.phone.trim().to_string(),
                address: request.customer.address.trim().to_string(),
            },
            status,
            total,
            payment_method,
            transaction_id,
            items: lines,
            issue_invoice: channel == Channel::Api || request.issue_invoice,
            update_profile: false,
        })
    }

    /// Line `i` priced and snapshotted, or `None` with errors recorded. Staff
    /// may fix the unit price; API lines are always priced from the catalog.
    fn price_line(
        &self,
        i: usize,
        item: &OrderLineInput,
        channel: Channel,
        errors: &mut ValidationErrors,
    ) -> Result<Option<(LineDraft, BigDecimal)>, DomainError> {
        let mut ok = true;
        if item.quantity < 1 {
            errors.add(format!("items.{i}.quantity"), "must be at least 1");
            ok = false;
        } else if item.quantity > pricing::MAX_QUANTITY {
            errors.add(
                format!("items.{i}.quantity"),
                format!("must be at most {}", pricing::MAX_QUANTITY),
            );
            ok = false;
        }
        let fixed_price = match channel {
            Channel::Admin => item.unit_price.as_ref(),
            Channel::Api => None,
        };
        match fixed_price {
            Some(p) if !pricing::is_storable_amount(p) => {
                errors.add(
                    format!("items.{i}.unit_price"),
                    "is too large or has more than two decimal places",
                );
                ok = false;
            }
            Some(p) if p < &BigDecimal::zero() => {
                errors.add(format!("items.{i}.unit_price"), "must not be negative");
                ok = false;
            }
            _ => {}
        }
        let Some(detail) = self.catalog.find_product(item.product_id)? else {
            errors.add(format!("items.{i}.product_id"), "does not exist");
            return Ok(None);
        };
        let selected = match resolve_variations(&detail.variations, &item.variations) {
            Ok(selected) => selected,
            Err(variation_errors) => {
                for (field, message) in variation_errors.iter() {
                    errors.add(format!("items.{i}.{field}"), message);
                }
                return Ok(None);
            }
        };
        if !ok {
            return Ok(None);
        }

        let unit_price = match fixed_price {
            Some(price) => pricing::round_money(price),
            None => {
                let chosen: Vec<&ProductVariation> = selected.iter().collect();
                pricing::quote(&detail.product, &chosen, item.quantity).unit_price
            }
        };
        let total = pricing::line_total(&unit_price, item.quantity);
        if !pricing::is_storable_amount(&total) {
            errors.add(format!("items.{i}.quantity"), "makes the line total too large");
            return Ok(None);
        }
        Ok(Some((
            LineDraft {
                product_id: detail.product.id,
                product_name: detail.product.name.clone(),
                quantity: item.quantity,
                unit_price,
                variations: selected.iter().map(SelectedVariation::from).collect(),
            },
            total,
        )))
    }

    /// Best-effort snapshot of an unfinished checkout. `Ok(None)` when there
    /// is nothing to record.
    pub fn capture_incomplete(
        &self,
        session_id: Option<&str>,
        capture: &IncompleteCapture,
    ) -> Result<Option<Uuid>, DomainError> {
        let Some(session_id) = session_id.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let Some(product_id) = capture.product_id else {
            return Ok(None);
        };
        let name = non_blank(&capture.customer_name).unwrap_or_default();
        let phone = non_blank(&capture.customer_phone).unwrap_or_default();
        if name.is_empty() && phone.is_empty() {
            return Ok(None);
        }
        let Some(detail) = self.catalog.find_product(product_id)? else {
            return Ok(None);
        };

        // Unknown or retired variations are dropped rather than rejected.
        let selected: Vec<&ProductVariation> = capture
            .variations
            .iter()
            .filter_map(|(attribute, id)| {
                detail.variations.iter().find(|v| {
                    v.id == *id && v.is_active && v.name.eq_ignore_ascii_case(attribute)
                })
            })
            .collect();
        let quantity = capture.quantity.unwrap_or(1).clamp(1, pricing::MAX_QUANTITY);
        let quote = pricing::quote(&detail.product, &selected, quantity);
        if !pricing::is_storable_amount(&quote.line_total) {
            return Ok(None);
        }

        let address = compose_address(
            non_blank(&capture.delivery_location).unwrap_or_default(),
            non_blank(&capture.thana).unwrap_or_default(),
            non_blank(&capture.district).unwrap_or_default(),
        );
        let mut draft = IncompleteDraft {
            capture_key: IncompleteDraft::capture_key(product_id, session_id),
            order_number: String::new(),
            session_id: session_id.to_string(),
            customer_name: truncate_chars(name, 255),
            customer_phone: truncate_chars(phone, 20),
            customer_address: (!address.is_empty()).then_some(address),
            total: quote.line_total,
            item: LineDraft {
                product_id,
                product_name: detail.product.name.clone(),
                quantity,
                unit_price: quote.unit_price,
                variations: selected.into_iter().map(SelectedVariation::from).collect(),
            },
        };

        let mut attempt = 1;
        loop {
            draft.order_number = OrderNumberKind::Incomplete.generate();
            match self.orders.upsert_incomplete(&draft) {
                Err(DomainError::Conflict(_)) if attempt < MAX_PLACEMENT_ATTEMPTS => attempt += 1,
                result => return result.map(Some),
            }
        }
    }

    pub fn track(&self, order_number: &str) -> Result<OrderView, DomainError> {
        self.orders
            .find_by_number(order_number.trim())?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn get(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn list(
        &self,
        scope: OrderScope,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderView>, DomainError> {
        self.orders.list(scope, page, limit)
    }

    pub fn counts(&self) -> Result<OrderCounts, DomainError> {
        self.orders.counts()
    }

    pub fn list_invoices(&self, page: i64, limit: i64) -> Result<Page<InvoiceView>, DomainError> {
        self.orders.list_invoices(page, limit)
    }

    pub fn update(&self, id: Uuid, update: OrderUpdate) -> Result<OrderView, DomainError> {
        let mut errors = ValidationErrors::new();
        if matches!(&update.customer_name, Some(n) if n.trim().is_empty() || n.chars().count() > 255)
        {
            errors.add("customer_name", "must be 1 to 255 characters");
        }
        if matches!(&update.customer_phone, Some(p) if p.trim().is_empty() || p.chars().count() > 20)
        {
            errors.add("customer_phone", "must be 1 to 20 characters");
        }
        if matches!(&update.total, Some(t) if t < &BigDecimal::zero()) {
            errors.add("total", "must not be negative");
        }
        errors.into_result()?;

        let current = self.get(id)?;
        if !current.status.can_transition_to(update.status) {
            return Err(DomainError::InvalidTransition {
                from: current.status,
                to: update.status,
            });
        }
        let update = OrderUpdate {
            total: update.total.as_ref().map(pricing::round_money),
            ..update
        };
        if !self.orders.update(id, current.status, &update)? {
            return Err(DomainError::Conflict(
                "order was modified concurrently, reload and try again".to_string(),
            ));
        }
        if current.status != update.status {
            log::info!(
                "Order {} moved from {} to {}",
                current.order_number,
                current.status,
                update.status
            );
        }
        self.get(id)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.orders.delete(id)? {
            return Err(DomainError::NotFound("Order"));
        }
        log::info!("Order {id} deleted");
        Ok(())
    }

    /// Moves every listed order whose current status allows it; the rest are
    /// counted as skipped.
    pub fn bulk_update_status(
        &self,
        ids: &[Uuid],
        status: OrderStatus,
    ) -> Result<BulkStatusOutcome, DomainError> {
        let ids: Vec<Uuid> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut errors = ValidationErrors::new();
        if ids.is_empty() {
            errors.add("order_ids", "must contain at least one id");
        }
        if status == OrderStatus::Incomplete {
            errors.add("status", "cannot move orders back to incomplete");
        }
        errors.into_result()?;

        let sources = OrderStatus::sources_for(status);
        let updated = self.orders.bulk_update_status(&ids, status, &sources)?;
        let outcome = BulkStatusOutcome {
            updated,
            skipped: ids.len().saturating_sub(updated),
        };
        log::info!(
            "Bulk status {status}: {} updated, {} skipped",
            outcome.updated,
            outcome.skipped
        );
        Ok(outcome)
    }

    pub fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Err(ValidationErrors::single("order_ids", "must contain at least one id").into());
        }
        let deleted = self.orders.bulk_delete(ids)?;
        log::info!("Bulk delete removed {deleted} order(s)");
        Ok(deleted)
    }

    /// Every placed order as CSV.
    pub fn export_csv(&self) -> Result<String, DomainError> {
        let orders = self.orders.all(OrderScope::Placed(None))?;
        Ok(report::orders_csv(&orders))
    }
}
