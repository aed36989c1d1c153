use crate::database::DbPool;
use crate::database::dao::member::insert_members;
use crate::database::error::DatabaseError;
use crate::database::model::member::NewMember;
use crate::notification::notifier::MessagingApi;
use crate::tools::log_message_and_return;
use chrono::{Datelike, Days, Local, NaiveDate};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MESSAGES_PATH: &str = "/v1/messages";
const DEMO_TOKEN: &str = "demo-token";

/// Start a fake messaging API and fill the database with members covering every notification.
pub async fn init_demo(pool: &DbPool) -> Result<MockServer, DatabaseError> {
    let mock_server = MockServer::start().await;
    mock_send_message(&mock_server).await;
    seed_members(pool)?;

    Ok(mock_server)
}

pub fn messaging_api(mock_server: &MockServer) -> MessagingApi {
    MessagingApi::new(
        format!("{}{MESSAGES_PATH}", mock_server.uri()),
        DEMO_TOKEN.to_owned(),
    )
}

async fn mock_send_message(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messaging_product": "whatsapp",
            "messages": [{ "id": "wamid.demo" }],
        })))
        .mount(mock_server)
        .await;
}

// region Members
fn seed_members(pool: &DbPool) -> Result<(), DatabaseError> {
    let today = Local::now().date_naive();
    let in_days = |days: i64| shift(today, days).map(|date| date.format("%Y-%m-%d").to_string());
    let birthday = today
        .with_year(today.year() - 30)
        .map(|date| date.format("%Y-%m-%d").to_string());

    let members = [
        demo_member("Jon Doe", "9876543210", None, in_days(7), false),
        demo_member("Jonette Snow", "+91 98765 43211", birthday.clone(), in_days(3), false),
        demo_member("Alice Bob", "919876543212", None, in_days(0), false),
        demo_member("Bob Alice", "98765-43213", birthday.clone(), in_days(-1), false),
        demo_member("Carol Dean", "", None, in_days(1), false),
        demo_member("Dave Earl", "9876543215", None, in_days(30), false),
        demo_member("Eve Faye", "9876543216", None, in_days(3), true),
        demo_member("Frank Gale", "9876543217", birthday, None, false),
    ];

    let mut connection = pool.get().map_err(log_message_and_return(
        "Can't get a connection to seed demo members.",
        DatabaseError::ConnectionFailed,
    ))?;
    let count = insert_members(&mut connection, &members)?;
    info!("Demo mode: {count} members added to the database.");

    Ok(())
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn demo_member<'a>(
    name: &'a str,
    mobile: &'a str,
    birth_date: Option<String>,
    membership_end_date: Option<String>,
    is_cancelled: bool,
) -> NewMember<'a> {
    NewMember {
        name,
        mobile,
        password: None,
        birth_date,
        membership_end_date,
        is_cancelled,
    }
}
// endregion
