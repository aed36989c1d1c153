use crate::notification::phone::normalize_phone_number;
use crate::tools::web::build_client;
use crate::web::error::WebError;
use chrono::NaiveDate;
use derive_getters::Getters;
use dto::member::Member;
use dto::notification_event::NotificationEvent;
use reqwest::Client;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TEMPLATE_LANGUAGE: &str = "en";
pub const DEFAULT_EXPIRY_TEMPLATE: &str = "membership_expiry_reminder";
pub const DEFAULT_EXPIRED_TEMPLATE: &str = "membership_expired_reminder";
pub const DEFAULT_BIRTHDAY_TEMPLATE: &str = "birthday_wishes";
const END_DATE_FORMAT: &str = "%d/%m/%Y";

// region Configuration
#[derive(Debug, Getters, Clone, PartialEq)]
pub struct MessagingApi {
    url: String,
    token: String,
}

impl MessagingApi {
    pub fn new(url: String, token: String) -> Self {
        Self { url, token }
    }
}

#[derive(Debug, Getters, Clone, PartialEq)]
pub struct MessageTemplates {
    language: String,
    expiry: String,
    expired: String,
    birthday: String,
}

impl MessageTemplates {
    pub fn new(language: String, expiry: String, expired: String, birthday: String) -> Self {
        Self {
            language,
            expiry,
            expired,
            birthday,
        }
    }
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::new(
            DEFAULT_TEMPLATE_LANGUAGE.to_owned(),
            DEFAULT_EXPIRY_TEMPLATE.to_owned(),
            DEFAULT_EXPIRED_TEMPLATE.to_owned(),
            DEFAULT_BIRTHDAY_TEMPLATE.to_owned(),
        )
    }
}

#[derive(Debug, Getters, Clone, PartialEq)]
pub struct MessagingConfig {
    /// When missing, messages are not sent at all.
    api: Option<MessagingApi>,
    country_code: String,
    templates: MessageTemplates,
    send_timeout: Duration,
}

impl MessagingConfig {
    pub fn new(
        api: Option<MessagingApi>,
        country_code: String,
        templates: MessageTemplates,
        send_timeout: Duration,
    ) -> Self {
        Self {
            api,
            country_code,
            templates,
            send_timeout,
        }
    }

    #[cfg(any(test, feature = "demo"))]
    pub fn with_api(mut self, api: MessagingApi) -> Self {
        self.api = Some(api);
        self
    }
}
// endregion

/// A message based on a template registered on the messaging platform.
#[derive(Debug, Getters, Clone, PartialEq)]
pub struct TemplateMessage {
    template: String,
    language: String,
    parameters: Vec<String>,
}

impl TemplateMessage {
    pub fn new(template: String, language: String, parameters: Vec<String>) -> Self {
        Self {
            template,
            language,
            parameters,
        }
    }

    /// Pick the template matching the event and fill its parameters.
    pub fn for_event(templates: &MessageTemplates, member: &Member, event: &NotificationEvent) -> Self {
        let name = member.name().clone();
        let (template, parameters) = match event {
            NotificationEvent::Expiry {
                days_left,
                end_date,
            } if *days_left >= 0 => (
                templates.expiry(),
                vec![name, days_left.to_string(), format_end_date(end_date)],
            ),
            NotificationEvent::Expiry {
                days_left,
                end_date,
            } => (
                templates.expired(),
                vec![
                    name,
                    days_left.unsigned_abs().to_string(),
                    format_end_date(end_date),
                ],
            ),
            NotificationEvent::Birthday => (templates.birthday(), vec![name]),
        };

        Self::new(template.clone(), templates.language().clone(), parameters)
    }
}

fn format_end_date(end_date: &NaiveDate) -> String {
    end_date.format(END_DATE_FORMAT).to_string()
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DispatchOutcome {
    Sent,
    Skipped(String),
    Failed(String),
}

pub trait Notifier {
    /// Make a single attempt to send the message. Never retries.
    fn send(
        &self,
        mobile: &str,
        message: &TemplateMessage,
    ) -> impl Future<Output = DispatchOutcome> + Send;
}

/// Send template messages through a WhatsApp Cloud-like HTTP API.
pub struct MessagingApiNotifier {
    client: Client,
    config: MessagingConfig,
}

impl MessagingApiNotifier {
    pub fn new(config: MessagingConfig) -> Result<Self, WebError> {
        let client = build_client(*config.send_timeout())?;
        if config.api().is_none() {
            warn!("Messaging API URL or token is missing. Notifications will be skipped.");
        }

        Ok(Self { client, config })
    }

    async fn post_message(
        &self,
        api: &MessagingApi,
        phone_number: &str,
        message: &TemplateMessage,
    ) -> Result<(), WebError> {
        let response = self
            .client
            .post(api.url())
            .bearer_auth(api.token())
            .json(&build_payload(phone_number, message))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WebError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Notifier for MessagingApiNotifier {
    async fn send(&self, mobile: &str, message: &TemplateMessage) -> DispatchOutcome {
        let Some(api) = self.config.api() else {
            info!(
                "Messaging API not configured, not sending {} message.",
                message.template()
            );
            return DispatchOutcome::Skipped("messaging API not configured".to_owned());
        };
        let Some(phone_number) = normalize_phone_number(mobile, self.config.country_code()) else {
            return DispatchOutcome::Skipped("no phone number".to_owned());
        };

        match self.post_message(api, &phone_number, message).await {
            Ok(()) => {
                debug!("Sent {} message to {phone_number}", message.template());
                DispatchOutcome::Sent
            }
            Err(error) => DispatchOutcome::Failed(error.to_string()),
        }
    }
}

fn build_payload(phone_number: &str, message: &TemplateMessage) -> Value {
    let parameters = message
        .parameters()
        .iter()
        .map(|parameter| json!({ "type": "text", "text": parameter }))
        .collect::<Vec<_>>();

    json!({
        "messaging_product": "whatsapp",
        "to": phone_number,
        "type": "template",
        "template": {
            "name": message.template(),
            "language": { "code": message.language() },
            "components": [{ "type": "body", "parameters": parameters }],
        },
    })
}
