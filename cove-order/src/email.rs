use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use cove_core::mailer::{Mailer, OutboundEmail};
use cove_core::messaging::{Chat, Message};
use tracing::{debug, warn};

use crate::models::Order;

/// Replace every `{{token}}` whose name appears in `values`. Tokens without
/// a value are left in place so a typo in a template is visible in the
/// delivered mail instead of silently dropping content.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (token, value) in values {
        rendered = rendered.replace(&format!("{{{{{}}}}}", token), value);
    }
    rendered
}

const CONFIRMATION_TEMPLATE: &str = "order-confirmation.html";
const MESSAGE_TEMPLATE: &str = "message-notification.html";

// Used when the template directory is missing or unreadable, so
// confirmations still go out on a misdeployed box.
const CONFIRMATION_FALLBACK: &str = "<p>Dear {{guest_name}},</p>\
<p>Your booking {{order_id}} is confirmed. We charged {{total}} {{currency}}.</p>\
<p>Reservation reference: {{references}}</p>";
const MESSAGE_FALLBACK: &str =
    "<p>{{guest_name}} wrote about booking {{reference}}:</p><blockquote>{{message}}</blockquote>";

/// Sends transactional mail. Every send is best-effort: failures are
/// logged and never bubble into the checkout or messaging flows.
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    templates_dir: PathBuf,
    admin_email: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, templates_dir: PathBuf, admin_email: String) -> Self {
        Self { mailer, templates_dir, admin_email }
    }

    async fn template(&self, name: &str, fallback: &str) -> String {
        match tokio::fs::read_to_string(self.templates_dir.join(name)).await {
            Ok(contents) => contents,
            Err(err) => {
                debug!(template = name, error = %err, "template not readable, using built-in fallback");
                fallback.to_string()
            }
        }
    }

    async fn deliver(&self, email: OutboundEmail) {
        if let Err(err) = self.mailer.send(&email).await {
            warn!(to = %email.to, subject = %email.subject, error = %err, "email delivery failed");
        }
    }

    /// Confirmation mail for a freshly placed order.
    pub async fn order_confirmation(&self, order: &Order) {
        let template = self.template(CONFIRMATION_TEMPLATE, CONFIRMATION_FALLBACK).await;
        let values = HashMap::from([
            ("guest_name", order.guest_name.clone()),
            ("order_id", order.order_id.clone()),
            ("total", format!("{:.2}", order.amount_minor as f64 / 100.0)),
            ("currency", order.currency.clone()),
            ("references", order.reservation_references.join(", ")),
        ]);
        self.deliver(OutboundEmail {
            to: order.email.0.clone(),
            subject: format!("Booking confirmation {}", order.order_id),
            html_body: render_template(&template, &values),
        })
        .await;
    }

    /// Tell staff a guest wrote in a thread.
    pub async fn guest_message_alert(&self, chat: &Chat, message: &Message) {
        let template = self.template(MESSAGE_TEMPLATE, MESSAGE_FALLBACK).await;
        let values = HashMap::from([
            ("guest_name", chat.guest_name.clone()),
            ("reference", chat.booking_reference.clone()),
            ("message", message.body.clone()),
        ]);
        self.deliver(OutboundEmail {
            to: self.admin_email.clone(),
            subject: format!("New message from {}", chat.guest_name),
            html_body: render_template(&template, &values),
        })
        .await;
    }

    /// Tell the guest staff replied in their thread.
    pub async fn admin_reply_alert(&self, to: &str, chat: &Chat, message: &Message) {
        let template = self.template(MESSAGE_TEMPLATE, MESSAGE_FALLBACK).await;
        let values = HashMap::from([
            ("guest_name", "our team".to_string()),
            ("reference", chat.booking_reference.clone()),
            ("message", message.body.clone()),
        ]);
        self.deliver(OutboundEmail {
            to: to.to_string(),
            subject: format!("New message about your stay {}", chat.booking_reference),
            html_body: render_template(&template, &values),
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_are_substituted() {
        let values = HashMap::from([
            ("guest_name", "Ada".to_string()),
            ("order_id", "CV-250704-X7KQ2M".to_string()),
        ]);
        let out = render_template("Hi {{guest_name}}, order {{order_id}} is in.", &values);
        assert_eq!(out, "Hi Ada, order CV-250704-X7KQ2M is in.");
    }

    #[test]
    fn unknown_tokens_survive_rendering() {
        let values = HashMap::from([("guest_name", "Ada".to_string())]);
        let out = render_template("Hi {{guest_name}}, total {{total}}.", &values);
        assert_eq!(out, "Hi Ada, total {{total}}.");
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        let values = HashMap::from([("reference", "HMXQZRT".to_string())]);
        let out = render_template("{{reference}} / {{reference}}", &values);
        assert_eq!(out, "HMXQZRT / HMXQZRT");
    }
}
