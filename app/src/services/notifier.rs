// storelink/app/src/services/notifier.rs

//! Notification fan-out for orders: customer, store owner and vendor, over email and SMS.

use crate::config::OwnerConfig;
use crate::models::{Order, Vendor};
use crate::services::email::{EmailMessage, EmailSender};
use crate::services::sms::{SmsOutcome, SmsService};
use crate::services::templates::{self, RenderedEmail};
use futures_util::future::{join_all, BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
  Customer,
  Owner,
  Vendor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  Email,
  Sms,
}

/// Outcome of one delivery attempt. `detail` holds the provider id or the error text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
  pub recipient: Recipient,
  pub channel: Channel,
  pub address: String,
  pub sent: bool,
  pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationReport {
  pub order_id: i64,
  pub deliveries: Vec<DeliveryRecord>,
}

impl NotificationReport {
  pub fn sent_count(&self) -> usize {
    self.deliveries.iter().filter(|d| d.sent).count()
  }

  pub fn failed_count(&self) -> usize {
    self.deliveries.iter().filter(|d| !d.sent).count()
  }

  pub fn is_empty(&self) -> bool {
    self.deliveries.is_empty()
  }
}

pub struct Notifier {
  email: Arc<dyn EmailSender>,
  sms: Arc<SmsService>,
  owner: OwnerConfig,
}

impl Notifier {
  pub fn new(email: Arc<dyn EmailSender>, sms: Arc<SmsService>, owner: OwnerConfig) -> Self {
    Self { email, sms, owner }
  }

  pub fn email(&self) -> &Arc<dyn EmailSender> {
    &self.email
  }

  pub fn sms(&self) -> &Arc<SmsService> {
    &self.sms
  }

  /// Notifies everyone interested in a new order. All deliveries run
  /// concurrently and are awaited before returning; a failing delivery never
  /// prevents the others.
  #[instrument(name = "notifier::new_order", skip_all, fields(order_id = order.order_id, vendor_id = ?vendor.map(|v| v.id)))]
  pub async fn notify_new_order(&self, order: &Order, vendor: Option<&Vendor>) -> NotificationReport {
    let mut deliveries: Vec<BoxFuture<'_, DeliveryRecord>> = Vec::new();

    let customer = &order.customer;
    if !customer.email.trim().is_empty() {
      deliveries.push(self.deliver_email(Recipient::Customer, customer.email.clone(), templates::new_order_email(order)));
    }
    if !customer.phone.trim().is_empty() {
      deliveries.push(self.deliver_sms(Recipient::Customer, customer.phone.clone(), templates::customer_order_sms(order)));
    }

    if let Some(phone) = &self.owner.phone {
      deliveries.push(self.deliver_sms(Recipient::Owner, phone.clone(), templates::owner_order_sms(order)));
    }
    if let Some(email) = &self.owner.email {
      deliveries.push(self.deliver_email(Recipient::Owner, email.clone(), templates::new_order_email(order)));
    }

    if let Some(phone) = vendor.and_then(Vendor::sms_number) {
      deliveries.push(self.deliver_sms(Recipient::Vendor, phone.to_string(), templates::vendor_order_sms(order)));
    }

    let report = NotificationReport {
      order_id: order.order_id,
      deliveries: join_all(deliveries).await,
    };
    info!(
      sent = report.sent_count(),
      failed = report.failed_count(),
      "New-order notifications dispatched"
    );
    report
  }

  /// Tells the customer their order status changed. Email only.
  #[instrument(name = "notifier::status_change", skip_all, fields(order_id = order.order_id, status = %order.status))]
  pub async fn notify_status_change(&self, order: &Order) -> NotificationReport {
    let mut report = NotificationReport {
      order_id: order.order_id,
      deliveries: Vec::new(),
    };
    if !order.customer.email.trim().is_empty() {
      let record = self
        .deliver_email(Recipient::Customer, order.customer.email.clone(), templates::order_update_email(order))
        .await;
      report.deliveries.push(record);
    }
    report
  }

  fn deliver_email(&self, recipient: Recipient, to: String, rendered: RenderedEmail) -> BoxFuture<'_, DeliveryRecord> {
    async move {
      let message = EmailMessage {
        to: to.clone(),
        subject: rendered.subject,
        html: rendered.html,
      };
      match self.email.send(&message).await {
        Ok(message_id) => DeliveryRecord {
          recipient,
          channel: Channel::Email,
          address: to,
          sent: true,
          detail: message_id,
        },
        Err(e) => {
          warn!(?recipient, to = %to, error = %e, "Email notification failed");
          DeliveryRecord {
            recipient,
            channel: Channel::Email,
            address: to,
            sent: false,
            detail: e.to_string(),
          }
        }
      }
    }
    .boxed()
  }

  fn deliver_sms(&self, recipient: Recipient, to: String, body: String) -> BoxFuture<'_, DeliveryRecord> {
    async move {
      let outcome = self.sms.send(&to, &body).await;
      let address = self.sms.normalize_number(&to).unwrap_or(to);
      match outcome {
        SmsOutcome::Sent { provider_message_id } => DeliveryRecord {
          recipient,
          channel: Channel::Sms,
          address,
          sent: true,
          detail: provider_message_id,
        },
        SmsOutcome::Failed { error_message } => DeliveryRecord {
          recipient,
          channel: Channel::Sms,
          address,
          sent: false,
          detail: error_message,
        },
      }
    }
    .boxed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::{AppError, Result as AppResult};
  use crate::models::Customer;
  use crate::services::sms::{SmsError, SmsTransport};
  use async_trait::async_trait;
  use parking_lot::Mutex;

  #[derive(Default)]
  struct RecordingEmail {
    sent: Mutex<Vec<String>>,
    fail_for: Option<String>,
  }

  #[async_trait]
  impl EmailSender for RecordingEmail {
    async fn send(&self, message: &EmailMessage) -> AppResult<String> {
      if self.fail_for.as_deref() == Some(message.to.as_str()) {
        return Err(AppError::Upstream("Brevo returned 500".into()));
      }
      self.sent.lock().push(message.to.clone());
      Ok(format!("email-{}", message.to))
    }
  }

  #[derive(Default)]
  struct RecordingSms {
    sent: Mutex<Vec<String>>,
  }

  #[async_trait]
  impl SmsTransport for RecordingSms {
    async fn deliver(&self, to: &str, _body: &str) -> Result<String, SmsError> {
      self.sent.lock().push(to.to_string());
      Ok(format!("sms-{}", to))
    }
  }

  fn order() -> Order {
    Order {
      order_id: 9,
      customer: Customer {
        name: "A B".into(),
        email: "a@b.com".into(),
        phone: "9999999999".into(),
        address: String::new(),
      },
      ..Default::default()
    }
  }

  fn notifier(email: Arc<RecordingEmail>, sms: Arc<RecordingSms>, owner: OwnerConfig) -> Notifier {
    Notifier::new(email, Arc::new(SmsService::new(sms, "+91")), owner)
  }

  #[tokio::test]
  async fn fans_out_to_every_configured_recipient() {
    let email = Arc::new(RecordingEmail::default());
    let sms = Arc::new(RecordingSms::default());
    let owner = OwnerConfig {
      phone: Some("+918888888888".into()),
      email: Some("owner@shop.in".into()),
    };
    let vendor = Vendor {
      id: 3,
      phone: "7777777777".into(),
      ..Default::default()
    };

    let report = notifier(email.clone(), sms.clone(), owner)
      .notify_new_order(&order(), Some(&vendor))
      .await;

    assert_eq!(report.deliveries.len(), 5);
    assert_eq!(report.sent_count(), 5);
    let mut numbers = sms.sent.lock().clone();
    numbers.sort();
    assert_eq!(numbers, vec!["+917777777777", "+918888888888", "+919999999999"]);
    let mut inboxes = email.sent.lock().clone();
    inboxes.sort();
    assert_eq!(inboxes, vec!["a@b.com", "owner@shop.in"]);
  }

  #[tokio::test]
  async fn one_failure_does_not_block_the_rest() {
    let email = Arc::new(RecordingEmail {
      fail_for: Some("a@b.com".into()),
      ..Default::default()
    });
    let sms = Arc::new(RecordingSms::default());

    let report = notifier(email, sms.clone(), OwnerConfig::default())
      .notify_new_order(&order(), None)
      .await;

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.sent_count(), 1);
    assert_eq!(sms.sent.lock().len(), 1);
    let failed = report.deliveries.iter().find(|d| !d.sent).unwrap();
    assert_eq!(failed.channel, Channel::Email);
    assert!(failed.detail.contains("500"));
  }

  #[tokio::test]
  async fn vendor_without_phone_gets_no_sms() {
    let sms = Arc::new(RecordingSms::default());
    let vendor = Vendor::default();
    let report = notifier(Arc::new(RecordingEmail::default()), sms.clone(), OwnerConfig::default())
      .notify_new_order(&order(), Some(&vendor))
      .await;
    assert!(report.deliveries.iter().all(|d| d.recipient != Recipient::Vendor));
    assert_eq!(sms.sent.lock().len(), 1);
  }

  #[tokio::test]
  async fn status_change_emails_customer_only() {
    let email = Arc::new(RecordingEmail::default());
    let sms = Arc::new(RecordingSms::default());
    let report = notifier(email.clone(), sms.clone(), OwnerConfig::default())
      .notify_status_change(&order())
      .await;
    assert_eq!(report.sent_count(), 1);
    assert_eq!(*email.sent.lock(), vec!["a@b.com"]);
    assert!(sms.sent.lock().is_empty());
  }
}
