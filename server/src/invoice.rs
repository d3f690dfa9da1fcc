//! Invoice generation
//!
//! An invoice is a pure function of the order and its line items at
//! generation time: the monetary figures come straight from the stored
//! order, never recomputed from live menu prices. The rendered HTML is
//! stored inline as a `data:text/html;base64` URL; swapping in blob
//! storage later only changes where `pdf_url` points.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::Invoice;
use sqlx::PgPool;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::db;
use crate::error::{ServiceError, ServiceResult};

/// Everything the rendered document embeds
#[derive(Debug)]
pub struct InvoiceData {
    pub invoice_number: String,
    pub restaurant_name: String,
    pub table_number: String,
    pub order_date: chrono::DateTime<chrono::Utc>,
    pub items: Vec<InvoiceLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

/// Create the invoice for an order, exactly once.
///
/// A second call (or a concurrent one) returns the already-persisted
/// invoice unchanged. The unique constraint on `invoices.order_id`
/// arbitrates races: the loser of the insert re-reads the winner's row.
pub async fn generate_for_order(pool: &PgPool, order_id: Uuid) -> ServiceResult<Invoice> {
    if let Some(existing) = db::invoices::find_by_order(pool, order_id).await? {
        return Ok(existing);
    }

    let detail = db::orders::find_detail(pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let invoice_number = db::invoices::next_invoice_number(pool).await?;
    let data = InvoiceData {
        invoice_number: invoice_number.clone(),
        restaurant_name: detail.restaurant.name,
        table_number: detail.table.table_number,
        order_date: detail.order.created_at,
        items: detail
            .items
            .iter()
            .map(|item| InvoiceLine {
                name: item.item_name.clone(),
                quantity: item.quantity,
                price: item.price_at_time,
                total: item.price_at_time * Decimal::from(item.quantity),
            })
            .collect(),
        subtotal: detail.order.subtotal,
        tax: detail.order.tax,
        total: detail.order.total,
    };

    let html = render_html(&data);
    let pdf_url = to_data_url(&html);

    match db::invoices::create(pool, order_id, &invoice_number, &pdf_url).await? {
        Some(invoice) => {
            tracing::info!(
                order_id = %order_id,
                invoice_number = %invoice.invoice_number,
                "Invoice created"
            );
            Ok(invoice)
        }
        // Lost the race; the allocated number becomes a sequence gap
        None => db::invoices::find_by_order(pool, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::App(AppError::with_message(
                    ErrorCode::InternalError,
                    "invoice insert conflicted but no row found",
                ))
            }),
    }
}

pub fn to_data_url(html: &str) -> String {
    format!("data:text/html;base64,{}", STANDARD.encode(html))
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the invoice document
pub fn render_html(data: &InvoiceData) -> String {
    let mut rows = String::new();
    for item in &data.items {
        let _ = write!(
            rows,
            r#"
          <tr>
            <td class="item-name">{name}</td>
            <td class="quantity">{quantity}</td>
            <td class="price">${price}</td>
            <td class="total">${total}</td>
          </tr>"#,
            name = escape(&item.name),
            quantity = item.quantity,
            price = money(item.price),
            total = money(item.total),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Invoice {number}</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; padding: 40px; color: #1a1a1a; }}
    .invoice {{ max-width: 800px; margin: 0 auto; }}
    .header {{ display: flex; justify-content: space-between; align-items: start; margin-bottom: 40px; padding-bottom: 20px; border-bottom: 2px solid #e5e5e5; }}
    .logo {{ font-size: 24px; font-weight: bold; color: #FF6B35; }}
    .invoice-details {{ text-align: right; }}
    .invoice-number {{ font-size: 20px; font-weight: bold; margin-bottom: 8px; }}
    .date {{ color: #666; font-size: 14px; }}
    .info-section {{ margin-bottom: 30px; }}
    .info-label {{ font-size: 12px; color: #666; text-transform: uppercase; letter-spacing: 0.5px; margin-bottom: 4px; }}
    .info-value {{ font-size: 16px; font-weight: 500; }}
    table {{ width: 100%; border-collapse: collapse; margin: 30px 0; }}
    thead {{ background: #f8f8f8; }}
    th {{ text-align: left; padding: 12px; font-size: 12px; color: #666; text-transform: uppercase; letter-spacing: 0.5px; border-bottom: 2px solid #e5e5e5; }}
    td {{ padding: 12px; border-bottom: 1px solid #f0f0f0; }}
    .item-name {{ font-weight: 500; }}
    .quantity {{ text-align: center; color: #666; }}
    .price, .total {{ text-align: right; }}
    .totals {{ margin-top: 20px; }}
    .totals-row {{ display: flex; justify-content: space-between; padding: 8px 12px; }}
    .totals-row.subtotal {{ color: #666; }}
    .totals-row.tax {{ color: #666; }}
    .totals-row.total {{ font-size: 18px; font-weight: bold; background: #f8f8f8; margin-top: 8px; padding: 12px; }}
    .footer {{ margin-top: 60px; padding-top: 20px; border-top: 1px solid #e5e5e5; text-align: center; color: #999; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="invoice">
    <div class="header">
      <div class="logo">{restaurant}</div>
      <div class="invoice-details">
        <div class="invoice-number">{number}</div>
        <div class="date">{date}</div>
      </div>
    </div>

    <div class="info-section">
      <div class="info-label">Table</div>
      <div class="info-value">Table {table}</div>
    </div>

    <table>
      <thead>
        <tr>
          <th>Item</th>
          <th class="quantity">Qty</th>
          <th class="price">Price</th>
          <th class="total">Total</th>
        </tr>
      </thead>
      <tbody>{rows}
      </tbody>
    </table>

    <div class="totals">
      <div class="totals-row subtotal">
        <span>Subtotal</span>
        <span>${subtotal}</span>
      </div>
      <div class="totals-row tax">
        <span>Tax</span>
        <span>${tax}</span>
      </div>
      <div class="totals-row total">
        <span>Total</span>
        <span>${total}</span>
      </div>
    </div>

    <div class="footer">
      Thank you for dining with us!
    </div>
  </div>
</body>
</html>
"#,
        number = escape(&data.invoice_number),
        restaurant = escape(&data.restaurant_name),
        date = data.order_date.format("%B %-d, %Y"),
        table = escape(&data.table_number),
        rows = rows,
        subtotal = money(data.subtotal),
        tax = money(data.tax),
        total = money(data.total),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> InvoiceData {
        InvoiceData {
            invoice_number: "INV-000042".to_string(),
            restaurant_name: "The Golden Fork".to_string(),
            table_number: "7".to_string(),
            order_date: chrono::Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap(),
            items: vec![InvoiceLine {
                name: "Burger".to_string(),
                quantity: 2,
                price: "12.99".parse().unwrap(),
                total: "25.98".parse().unwrap(),
            }],
            subtotal: "25.98".parse().unwrap(),
            tax: "2.60".parse().unwrap(),
            total: "28.58".parse().unwrap(),
        }
    }

    #[test]
    fn test_render_embeds_stored_figures() {
        let html = render_html(&sample());
        assert!(html.contains("INV-000042"));
        assert!(html.contains("The Golden Fork"));
        assert!(html.contains("Table 7"));
        assert!(html.contains("$25.98"));
        assert!(html.contains("$2.60"));
        assert!(html.contains("$28.58"));
        assert!(html.contains("March 14, 2026"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let mut data = sample();
        data.restaurant_name = "Fish & <Chips>".to_string();
        let html = render_html(&data);
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(!html.contains("<Chips>"));
    }

    #[test]
    fn test_data_url_roundtrip() {
        let url = to_data_url("<html>hi</html>");
        let encoded = url.strip_prefix("data:text/html;base64,").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"<html>hi</html>");
    }

    #[test]
    fn test_money_formats_two_places() {
        assert_eq!(money("12.9".parse().unwrap()), "12.90");
        assert_eq!(money("2.598".parse().unwrap()), "2.60");
        assert_eq!(money("5".parse().unwrap()), "5.00");
    }
}
