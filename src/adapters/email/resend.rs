//! Resend implementation of NotificationSender.
//!
//! Sends plain-text digests through the Resend HTTP API. Template
//! rendering belongs to the surrounding application; the bodies built
//! here are the minimal readable form of each digest.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;

use crate::config::EmailConfig;
use crate::domain::foundation::{ActorRole, ClientId, DomainError, ErrorCode};
use crate::domain::notification::EventDescriptor;
use crate::domain::plan::ResolvedStage;
use crate::ports::{Contact, NotificationSender};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Resend implementation of NotificationSender.
#[derive(Clone)]
pub struct ResendNotificationSender {
    http: reqwest::Client,
    config: EmailConfig,
    endpoint: String,
}

impl ResendNotificationSender {
    /// Creates a sender against the production Resend endpoint.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }

    /// Overrides the API endpoint (for tests against a local stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send(&self, to: &[&str], subject: &str, text: &str) -> Result<(), DomainError> {
        let payload = json!({
            "from": self.config.from_header(),
            "to": to,
            "subject": subject,
            "text": text,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.config.resend_api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::NotificationError, format!("Resend request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::new(
                ErrorCode::NotificationError,
                format!("Resend returned status {}", response.status()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    async fn send_client_digest(
        &self,
        _client_id: &ClientId,
        contact: &Contact,
        actor_name: &str,
        events: &[EventDescriptor],
    ) -> Result<(), DomainError> {
        let subject = client_digest_subject(events.len());
        let text = client_digest_body(&contact.name, actor_name, events);
        self.send(&[contact.email.as_str()], &subject, &text).await
    }

    async fn send_admin_digest(
        &self,
        admins: &[Contact],
        actor_name: &str,
        actor_role: ActorRole,
        client_name: &str,
        events: &[EventDescriptor],
    ) -> Result<(), DomainError> {
        let to: Vec<&str> = admins.iter().map(|a| a.email.as_str()).collect();
        let subject = admin_digest_subject(client_name, events.len());
        let text = admin_digest_body(actor_name, actor_role, client_name, events);
        self.send(&to, &subject, &text).await
    }

    async fn send_plan_summary(
        &self,
        _client_id: &ClientId,
        contact: &Contact,
        stages: &[ResolvedStage],
    ) -> Result<(), DomainError> {
        let subject = "Your onboarding plan has been updated".to_string();
        let text = plan_summary_body(&contact.name, stages);
        self.send(&[contact.email.as_str()], &subject, &text).await
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Body Builders
// ════════════════════════════════════════════════════════════════════════════════

fn event_line(event: &EventDescriptor) -> String {
    match &event.path {
        Some(path) => format!("  - {} (in {})", event.name, path),
        None => format!("  - {}", event.name),
    }
}

fn client_digest_subject(count: usize) -> String {
    if count == 1 {
        "New activity in your onboarding portal".to_string()
    } else {
        format!("{} new updates in your onboarding portal", count)
    }
}

fn client_digest_body(contact_name: &str, actor_name: &str, events: &[EventDescriptor]) -> String {
    let mut body = format!("Hi {},\n\n{} added to your portal:\n\n", contact_name, actor_name);
    for event in events {
        body.push_str(&event_line(event));
        body.push('\n');
    }
    body.push_str("\nLog in to review the changes.\n");
    body
}

fn admin_digest_subject(client_name: &str, count: usize) -> String {
    format!("{}: {} new item(s)", client_name, count)
}

fn admin_digest_body(
    actor_name: &str,
    actor_role: ActorRole,
    client_name: &str,
    events: &[EventDescriptor],
) -> String {
    let mut body = format!(
        "{} ({}) uploaded to {}:\n\n",
        actor_name, actor_role, client_name
    );
    for event in events {
        body.push_str(&event_line(event));
        body.push('\n');
    }
    body
}

fn plan_summary_body(contact_name: &str, stages: &[ResolvedStage]) -> String {
    let mut body = format!(
        "Hi {},\n\nYour onboarding plan now has {} stage(s):\n\n",
        contact_name,
        stages.len()
    );
    for stage in stages {
        body.push_str(&format!("  {}. {} ({})", stage.order_index, stage.name, stage.status));
        if let Some(date) = stage.start_date {
            body.push_str(&format!(", starts {}", date));
        }
        body.push('\n');
    }
    body
}
