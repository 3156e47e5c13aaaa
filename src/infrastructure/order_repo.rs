use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::{count_star, sql, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::Page;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{InvoiceDraft, InvoiceStatus, InvoiceView};
use crate::domain::order::{
    IncompleteDraft, LineDraft, OrderCounts, OrderDraft, OrderItemView, OrderScope, OrderStatus,
    OrderUpdate, OrderView, PaymentMethod, PlacedOrder, SelectedVariation,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{invoices, order_items, orders, users};

use super::models::{
    InvoiceRow, NewInvoiceRow, NewOrderItemRow, NewOrderRow, OrderChangeset, OrderItemRow,
    OrderRow, ProfileChangeset,
};
use super::offset;

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("stored {what} is unreadable: {detail}"))
}

fn insert_items(
    conn: &mut PgConnection,
    order_id: Uuid,
    lines: &[LineDraft],
) -> Result<(), DomainError> {
    let rows = lines
        .iter()
        .enumerate()
        .map(|(position, line)| {
            Ok(NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id,
                position: position as i32,
                product_id: Some(line.product_id),
                product_name: &line.product_name,
                quantity: line.quantity,
                unit_price: &line.unit_price,
                variations: serde_json::to_value(&line.variations)
                    .map_err(|e| DomainError::Internal(e.to_string()))?,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    diesel::insert_into(order_items::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn to_item(row: OrderItemRow) -> Result<OrderItemView, DomainError> {
    let variations: Vec<SelectedVariation> =
        serde_json::from_value(row.variations).map_err(|e| corrupt("variations", e))?;
    Ok(OrderItemView {
        id: row.id,
        product_id: row.product_id,
        product_name: row.product_name,
        quantity: row.quantity,
        unit_price: row.unit_price,
        variations,
    })
}

fn to_view(
    row: OrderRow,
    items: Vec<OrderItemRow>,
    invoice_number: Option<String>,
) -> Result<OrderView, DomainError> {
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|e| corrupt("order status", e))?;
    let payment_method = row
        .payment_method
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()
        .map_err(|e| corrupt("payment method", e))?;
    Ok(OrderView {
        id: row.id,
        order_number: row.order_number,
        user_id: row.user_id,
        session_id: row.session_id,
        customer_name: row.customer_name,
        customer_phone: row.customer_phone,
        customer_address: row.customer_address,
        total: row.total,
        status,
        payment_method,
        transaction_id: row.transaction_id,
        invoice_number,
        created_at: row.created_at,
        updated_at: row.updated_at,
        items: items.into_iter().map(to_item).collect::<Result<_, _>>()?,
    })
}

/// Attach line items and invoice numbers to a batch of order rows.
fn assemble(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?
        .grouped_by(&rows);

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let numbers: HashMap<Uuid, String> = invoices::table
        .filter(invoices::order_id.eq_any(&ids))
        .select((invoices::order_id, invoices::invoice_number))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .collect();

    rows.into_iter()
        .zip(items)
        .map(|(row, items)| {
            let number = numbers.get(&row.id).cloned();
            to_view(row, items, number)
        })
        .collect()
}

fn scoped(scope: OrderScope) -> orders::BoxedQuery<'static, Pg> {
    let query = orders::table.into_boxed();
    match scope {
        OrderScope::Incomplete => {
            query.filter(orders::status.eq(OrderStatus::Incomplete.as_str()))
        }
        OrderScope::Placed(None) => {
            query.filter(orders::status.ne(OrderStatus::Incomplete.as_str()))
        }
        OrderScope::Placed(Some(status)) => query.filter(orders::status.eq(status.as_str())),
    }
}

fn to_invoice(row: InvoiceRow, order_number: String) -> Result<InvoiceView, DomainError> {
    Ok(InvoiceView {
        id: row.id,
        invoice_number: row.invoice_number,
        order_id: row.order_id,
        order_number,
        customer_name: row.customer_name,
        customer_phone: row.customer_phone,
        delivery_address: row.delivery_address,
        payment_method: row
            .payment_method
            .parse()
            .map_err(|e| corrupt("payment method", e))?,
        transaction_id: row.transaction_id,
        subtotal: row.subtotal,
        delivery_charge: row.delivery_charge,
        total_amount: row.total_amount,
        status: row
            .status
            .parse::<InvoiceStatus>()
            .map_err(|e| corrupt("invoice status", e))?,
        invoice_date: row.invoice_date,
    })
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    order_number: &draft.order_number,
                    user_id: draft.user_id,
                    session_id: None,
                    capture_key: None,
                    customer_name: &draft.customer.name,
                    customer_phone: &draft.customer.phone,
                    customer_address: Some(&draft.customer.address),
                    total: &draft.total,
                    status: draft.status.as_str(),
                    payment_method: draft.payment_method.as_ref().map(PaymentMethod::as_str),
                    transaction_id: draft.transaction_id.as_deref(),
                })
                .execute(conn)?;

            // 2. Insert its line items
            insert_items(conn, order_id, &draft.items)?;

            // 3. Issue the invoice, numbered from the sequence so concurrent
            //    placements never share a number.
            let invoice_number = if draft.issue_invoice {
                let sequence: i64 =
                    diesel::select(sql::<BigInt>("nextval('invoice_number_seq')"))
                        .get_result(conn)?;
                let invoice = InvoiceDraft::for_order(draft, Utc::now());
                let number = invoice.number(sequence);
                diesel::insert_into(invoices::table)
                    .values(&NewInvoiceRow {
                        id: Uuid::new_v4(),
                        invoice_number: &number,
                        order_id,
                        customer_name: &invoice.customer_name,
                        customer_phone: &invoice.customer_phone,
                        delivery_address: &invoice.delivery_address,
                        payment_method: invoice.payment_method.as_str(),
                        transaction_id: invoice.transaction_id.as_deref(),
                        subtotal: &invoice.subtotal,
                        delivery_charge: &invoice.delivery_charge,
                        total_amount: &invoice.total_amount,
                        status: InvoiceStatus::Pending.as_str(),
                        invoice_date: invoice.invoice_date,
                    })
                    .execute(conn)?;
                Some(number)
            } else {
                None
            };

            // 4. Last-used delivery details become the customer's profile.
            if let (true, Some(user_id)) = (draft.update_profile, draft.user_id) {
                diesel::update(users::table.find(user_id))
                    .set(&ProfileChangeset {
                        name: &draft.customer.name,
                        phone: &draft.customer.phone,
                        address: &draft.customer.address,
                        updated_at: Utc::now(),
                    })
                    .execute(conn)?;
            }

            Ok(PlacedOrder {
                order_id,
                order_number: draft.order_number.clone(),
                invoice_number,
            })
        })
    }

    fn upsert_incomplete(&self, draft: &IncompleteDraft) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let id: Uuid = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    order_number: &draft.order_number,
                    user_id: None,
                    session_id: Some(&draft.session_id),
                    capture_key: Some(&draft.capture_key),
                    customer_name: &draft.customer_name,
                    customer_phone: &draft.customer_phone,
                    customer_address: draft.customer_address.as_deref(),
                    total: &draft.total,
                    status: OrderStatus::Incomplete.as_str(),
                    payment_method: None,
                    transaction_id: None,
                })
                .on_conflict(orders::capture_key)
                .do_update()
                .set((
                    orders::customer_name.eq(excluded(orders::customer_name)),
                    orders::customer_phone.eq(excluded(orders::customer_phone)),
                    orders::customer_address.eq(excluded(orders::customer_address)),
                    orders::total.eq(excluded(orders::total)),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(orders::id)
                .get_result(conn)?;

            diesel::delete(order_items::table.filter(order_items::order_id.eq(id)))
                .execute(conn)?;
            insert_items(conn, id, std::slice::from_ref(&draft.item))?;
            Ok(id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };
        Ok(assemble(&mut conn, vec![order])?.pop())
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };
        Ok(assemble(&mut conn, vec![order])?.pop())
    }

    fn list(
        &self,
        scope: OrderScope,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = scoped(scope).count().get_result(conn)?;

            let rows = scoped(scope)
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset(page, limit))
                .load(conn)?;

            Ok(Page {
                items: assemble(conn, rows)?,
                total,
            })
        })
    }

    fn all(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = scoped(scope)
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.desc()))
            .load(&mut conn)?;
        assemble(&mut conn, rows)
    }

    fn update(
        &self,
        id: Uuid,
        expected: OrderStatus,
        update: &OrderUpdate,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let changed = diesel::update(
            orders::table
                .filter(orders::id.eq(id))
                .filter(orders::status.eq(expected.as_str())),
        )
        .set(&OrderChangeset {
            status: update.status.as_str(),
            customer_name: update.customer_name.as_deref(),
            customer_phone: update.customer_phone.as_deref(),
            customer_address: update.customer_address.as_deref().map(Some),
            total: update.total.as_ref(),
            capture_key: (update.status != OrderStatus::Incomplete).then_some(None),
            updated_at: Utc::now(),
        })
        .execute(&mut conn)?;
        Ok(changed > 0)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn bulk_update_status(
        &self,
        ids: &[Uuid],
        status: OrderStatus,
        from: &[OrderStatus],
    ) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let sources: Vec<&str> = from.iter().map(OrderStatus::as_str).collect();
        let changed = diesel::update(
            orders::table
                .filter(orders::id.eq_any(ids))
                .filter(orders::status.eq_any(sources)),
        )
        .set((
            orders::status.eq(status.as_str()),
            orders::capture_key.eq(None::<String>),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(changed)
    }

    fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        // Items and invoices go with their order via ON DELETE CASCADE.
        let deleted =
            diesel::delete(orders::table.filter(orders::id.eq_any(ids))).execute(&mut conn)?;
        Ok(deleted)
    }

    fn counts(&self) -> Result<OrderCounts, DomainError> {
        let mut conn = self.pool.get()?;
        let by_status: HashMap<String, i64> = orders::table
            .filter(orders::status.eq_any([
                OrderStatus::Pending.as_str(),
                OrderStatus::Incomplete.as_str(),
            ]))
            .group_by(orders::status)
            .select((orders::status, count_star()))
            .load::<(String, i64)>(&mut conn)?
            .into_iter()
            .collect();
        let count = |status: OrderStatus| by_status.get(status.as_str()).copied().unwrap_or(0);
        Ok(OrderCounts {
            pending: count(OrderStatus::Pending),
            incomplete: count(OrderStatus::Incomplete),
        })
    }

    fn count_placed(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(scoped(OrderScope::Placed(None))
            .count()
            .get_result(&mut conn)?)
    }

    fn revenue(&self) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;
        let revenue: Option<BigDecimal> = orders::table
            .filter(orders::status.ne(OrderStatus::Incomplete.as_str()))
            .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
            .select(sum(orders::total))
            .first(&mut conn)?;
        Ok(revenue.unwrap_or_default())
    }

    fn list_invoices(&self, page: i64, limit: i64) -> Result<Page<InvoiceView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = invoices::table.count().get_result(conn)?;

            let rows = invoices::table
                .inner_join(orders::table)
                .select((InvoiceRow::as_select(), orders::order_number))
                .order((invoices::invoice_date.desc(), invoices::invoice_number.desc()))
                .limit(limit)
                .offset(offset(page, limit))
                .load::<(InvoiceRow, String)>(conn)?;

            Ok(Page {
                items: rows
                    .into_iter()
                    .map(|(row, number)| to_invoice(row, number))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
