use crate::config::error::ConfigurationError;
use crate::config::error::ConfigurationError::{
    InvalidBoolean, InvalidCountryCode, InvalidMaxConcurrentSends, InvalidNumber, InvalidRunAt,
    InvalidTriggerDays, MissingDatabaseUrl,
};
use crate::notification::classification::{ClassificationRules, DEFAULT_TRIGGER_DAYS};
use crate::notification::notifier::{
    DEFAULT_BIRTHDAY_TEMPLATE, DEFAULT_EXPIRED_TEMPLATE, DEFAULT_EXPIRY_TEMPLATE,
    DEFAULT_SEND_TIMEOUT, DEFAULT_TEMPLATE_LANGUAGE, MessageTemplates, MessagingApi,
    MessagingConfig,
};
use crate::notification::phone::DEFAULT_COUNTRY_CODE;
use crate::notification::sweep::MAX_CONCURRENT_SENDS;
use crate::scheduler::DEFAULT_RUN_AT;
use crate::tools::env_args::{is_flag_set, retrieve_arg_value, retrieve_expected_arg_value};
use chrono::NaiveTime;
use derive_getters::Getters;
use std::time::Duration;

pub mod error;

const DATABASE_URL_ARG: &str = "--database-url";
const MESSAGING_API_URL_ARG: &str = "--messaging-api-url";
const MESSAGING_API_TOKEN_ARG: &str = "--messaging-api-token";
const RUN_AT_ARG: &str = "--run-at";
const TRIGGER_DAYS_ARG: &str = "--trigger-days";
const SUPPRESS_BIRTHDAY_AFTER_EXPIRY_ARG: &str = "--suppress-birthday-after-expiry";
const COUNTRY_CODE_ARG: &str = "--country-code";
const TEMPLATE_LANGUAGE_ARG: &str = "--template-language";
const EXPIRY_TEMPLATE_ARG: &str = "--expiry-template";
const EXPIRED_TEMPLATE_ARG: &str = "--expired-template";
const BIRTHDAY_TEMPLATE_ARG: &str = "--birthday-template";
const SEND_TIMEOUT_SECS_ARG: &str = "--send-timeout-secs";
const MAX_CONCURRENT_SENDS_ARG: &str = "--max-concurrent-sends";
const RUN_ON_STARTUP_ARG: &str = "--run-on-startup";

/// Everything the process needs, read once at startup.
#[derive(Debug, Getters, Clone, PartialEq)]
pub struct AppConfig {
    database_url: String,
    run_at: NaiveTime,
    run_on_startup: bool,
    rules: ClassificationRules,
    messaging: MessagingConfig,
    max_concurrent_sends: usize,
}

impl AppConfig {
    /// Build the configuration from the process args, or the environment when an arg is missing.
    pub fn load() -> Result<Self, ConfigurationError> {
        let database_url = retrieve_expected_arg_value(DATABASE_URL_ARG, MissingDatabaseUrl)?;
        let run_at = retrieve_arg_value(RUN_AT_ARG)
            .map(|value| parse_run_at(&value))
            .transpose()?
            .unwrap_or(DEFAULT_RUN_AT);
        let trigger_days = retrieve_arg_value(TRIGGER_DAYS_ARG)
            .map(|value| parse_trigger_days(&value))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_TRIGGER_DAYS.to_vec());
        let suppress_birthday_after_expiry =
            retrieve_bool(SUPPRESS_BIRTHDAY_AFTER_EXPIRY_ARG, true)?;
        let max_concurrent_sends = retrieve_number(MAX_CONCURRENT_SENDS_ARG, 1)? as usize;
        if max_concurrent_sends > MAX_CONCURRENT_SENDS {
            return Err(InvalidMaxConcurrentSends {
                value: max_concurrent_sends,
                max: MAX_CONCURRENT_SENDS,
            });
        }

        Ok(Self {
            database_url,
            run_at,
            run_on_startup: retrieve_bool(RUN_ON_STARTUP_ARG, false)?,
            rules: ClassificationRules::new(trigger_days, suppress_birthday_after_expiry),
            messaging: load_messaging_config()?,
            max_concurrent_sends,
        })
    }

    #[cfg(feature = "demo")]
    pub fn for_demo(mut self, messaging_api: MessagingApi) -> Self {
        self.messaging = self.messaging.with_api(messaging_api);
        self.run_on_startup = true;
        self
    }
}

fn load_messaging_config() -> Result<MessagingConfig, ConfigurationError> {
    let api = match (
        retrieve_arg_value(MESSAGING_API_URL_ARG),
        retrieve_arg_value(MESSAGING_API_TOKEN_ARG),
    ) {
        (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
            Some(MessagingApi::new(url, token))
        }
        _ => None,
    };

    let country_code = retrieve_arg_value(COUNTRY_CODE_ARG)
        .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_owned());
    if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(InvalidCountryCode(country_code));
    }

    let templates = MessageTemplates::new(
        retrieve_string(TEMPLATE_LANGUAGE_ARG, DEFAULT_TEMPLATE_LANGUAGE),
        retrieve_string(EXPIRY_TEMPLATE_ARG, DEFAULT_EXPIRY_TEMPLATE),
        retrieve_string(EXPIRED_TEMPLATE_ARG, DEFAULT_EXPIRED_TEMPLATE),
        retrieve_string(BIRTHDAY_TEMPLATE_ARG, DEFAULT_BIRTHDAY_TEMPLATE),
    );
    let send_timeout = Duration::from_secs(retrieve_number(
        SEND_TIMEOUT_SECS_ARG,
        DEFAULT_SEND_TIMEOUT.as_secs(),
    )?);

    Ok(MessagingConfig::new(
        api,
        country_code,
        templates,
        send_timeout,
    ))
}

// region Parsing
fn parse_run_at(value: &str) -> Result<NaiveTime, ConfigurationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| InvalidRunAt(value.to_owned()))
}

/// Order is kept, duplicates are dropped.
fn parse_trigger_days(value: &str) -> Result<Vec<i64>, ConfigurationError> {
    let mut trigger_days = Vec::new();
    for day in value.split(',') {
        let day = day
            .trim()
            .parse::<i64>()
            .map_err(|_| InvalidTriggerDays(value.to_owned()))?;
        if !trigger_days.contains(&day) {
            trigger_days.push(day);
        }
    }

    Ok(trigger_days)
}

fn parse_bool(arg: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(InvalidBoolean {
            arg: arg.to_owned(),
            value: value.to_owned(),
        }),
    }
}
// endregion

// region Retrieve args
fn retrieve_string(arg: &str, default: &str) -> String {
    retrieve_arg_value(arg)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn retrieve_bool(arg: &str, default: bool) -> Result<bool, ConfigurationError> {
    if is_flag_set(arg) {
        return Ok(true);
    }

    retrieve_arg_value(arg)
        .map(|value| parse_bool(arg, &value))
        .transpose()
        .map(|value| value.unwrap_or(default))
}

fn retrieve_number(arg: &str, default: u64) -> Result<u64, ConfigurationError> {
    retrieve_arg_value(arg)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|number| *number > 0)
                .ok_or_else(|| InvalidNumber {
                    arg: arg.to_owned(),
                    value: value.clone(),
                })
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}
// endregion
