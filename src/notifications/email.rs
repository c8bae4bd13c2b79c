//! Order e-mails.
//!
//! Without `SMTP_HOST` the message is written to the log instead of being
//! sent, which is the normal development setup.

use async_trait::async_trait;

use super::Notifier;
use crate::config::Config;
use crate::domain::{Order, OrderStatus};
use crate::errors::{AppError, AppResult};

/// A rendered e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Status update mail for the order's customer.
    pub fn order_status(from: impl Into<String>, order: &Order) -> Self {
        let headline = match order.status {
            OrderStatus::Pending => "has been received",
            OrderStatus::InProgress => "is being prepared",
            OrderStatus::Delivered => "has been delivered",
        };

        let lines: Vec<String> = order
            .items
            .iter()
            .map(|i| format!("  {} x {} kg = {}", i.product_name, i.quantity, i.total))
            .collect();

        let body = format!(
            "Hello {name},\n\n\
             Your order #{id} {headline}.\n\n\
             {lines}\n\
             Total: {total}\n\n\
             Delivery to: {address}, {city} {pincode}\n",
            name = order.customer_name,
            id = order.id,
            headline = headline,
            lines = lines.join("\n"),
            total = order.total_amount,
            address = order.delivery_address,
            city = order.delivery_city,
            pincode = order.delivery_pincode,
        );

        Self {
            from: from.into(),
            to: order.customer_email.clone(),
            subject: format!("Order #{} {}", order.id, headline),
            body,
        }
    }
}

/// E-mail notifier driven by the SMTP settings in [`Config`].
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    smtp_host: Option<String>,
    from: String,
}

impl EmailNotifier {
    pub fn new(smtp_host: Option<String>, from: impl Into<String>) -> Self {
        Self {
            smtp_host,
            from: from.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.smtp_host.clone(), config.smtp_from.clone())
    }

    fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            "Processing order email"
        );

        let Some(host) = self.smtp_host.as_deref() else {
            tracing::info!(
                "=== EMAIL (not sent) ===\n\
                 From: {}\n\
                 To: {}\n\
                 Subject: {}\n\
                 Body:\n{}\n\
                 ========================",
                message.from,
                message.to,
                message.subject,
                message.body
            );
            return Ok(());
        };

        // TODO: send through an SMTP client once one is added to the stack.
        Err(AppError::internal(format!(
            "no SMTP transport available for host {}",
            host
        )))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn order_status_changed(&self, order: &Order) -> AppResult<()> {
        let message = EmailMessage::order_status(&self.from, order);
        self.deliver(&message)
    }
}
