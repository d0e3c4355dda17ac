// storelink/app/src/services/templates.rs

//! HTML bodies for transactional emails and the short SMS texts.

use crate::models::Order;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
  pub subject: String,
  pub html: String,
}

/// Minimal HTML escaping for values that come from upstream payloads.
fn escape(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

pub fn new_order_email(order: &Order) -> RenderedEmail {
  let items: String = order
    .items
    .iter()
    .map(|item| {
      format!(
        "<li>{} &times; {} ({} {})</li>",
        item.quantity,
        escape(&item.name),
        escape(&item.total),
        escape(&order.currency)
      )
    })
    .collect();

  RenderedEmail {
    subject: format!("Order Placed Successfully (#{})", order.order_id),
    html: format!(
      "<h2>New Order Received</h2>\
       <p>Order ID: <strong>{id}</strong></p>\
       <p>Status: {status}</p>\
       <p>Total: {total} {currency}</p>\
       <p>Customer: {name}</p>\
       <p>Email: {email}</p>\
       <p>Phone: {phone}</p>\
       <ul>{items}</ul>",
      id = order.order_id,
      status = escape(&order.status),
      total = escape(&order.total),
      currency = escape(&order.currency),
      name = escape(&order.customer.name),
      email = escape(&order.customer.email),
      phone = escape(&order.customer.phone),
      items = items,
    ),
  }
}

pub fn order_update_email(order: &Order) -> RenderedEmail {
  RenderedEmail {
    subject: format!("Order #{} Status Updated", order.order_id),
    html: format!(
      "<h2>Order Status Updated</h2>\
       <p>Order ID: <strong>{id}</strong></p>\
       <p>New Status: <strong>{status}</strong></p>\
       <p>Total: {total} {currency}</p>",
      id = order.order_id,
      status = escape(&order.status),
      total = escape(&order.total),
      currency = escape(&order.currency),
    ),
  }
}

pub fn customer_order_sms(order: &Order) -> String {
  format!(
    "Thank you for your order #{}! Total: {} {}. Status: {}.",
    order.order_id, order.total, order.currency, order.status
  )
}

pub fn owner_order_sms(order: &Order) -> String {
  format!(
    "New order #{} from {} - {} {}.",
    order.order_id,
    if order.customer.name.is_empty() { "a customer" } else { order.customer.name.as_str() },
    order.total,
    order.currency
  )
}

pub fn vendor_order_sms(order: &Order) -> String {
  let item_count: i64 = order.items.iter().map(|i| i.quantity).sum();
  format!(
    "You have a new order #{} ({} item(s), {} {}).",
    order.order_id, item_count, order.total, order.currency
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Customer, LineItem};

  fn order() -> Order {
    Order {
      order_id: 501,
      status: "processing".into(),
      total: "250.00".into(),
      customer: Customer {
        name: "A <B>".into(),
        email: "a@b.com".into(),
        phone: "9999999999".into(),
        address: String::new(),
      },
      items: vec![LineItem {
        name: "Item".into(),
        quantity: 2,
        total: "200".into(),
        ..Default::default()
      }],
      ..Default::default()
    }
  }

  #[test]
  fn new_order_email_contains_order_facts() {
    let email = new_order_email(&order());
    assert!(email.subject.contains("#501"));
    assert!(email.html.contains("<strong>501</strong>"));
    assert!(email.html.contains("250.00 INR"));
    assert!(email.html.contains("A &lt;B&gt;"));
    assert!(email.html.contains("2 &times; Item"));
  }

  #[test]
  fn update_email_shows_new_status() {
    let email = order_update_email(&order());
    assert_eq!(email.subject, "Order #501 Status Updated");
    assert!(email.html.contains("New Status: <strong>processing</strong>"));
  }

  #[test]
  fn sms_texts_mention_the_order() {
    let o = order();
    assert!(customer_order_sms(&o).contains("#501"));
    assert!(owner_order_sms(&o).contains("A <B>"));
    assert!(vendor_order_sms(&o).contains("2 item(s)"));
  }
}
