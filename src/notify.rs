use chrono::NaiveDate;
use once_cell::sync::Lazy;

static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Fire-and-forget leave notification to the external email API. One call per
/// submission; a failure is logged and never surfaced to the requester.
pub fn send_leave_email(
    email_api_url: Option<String>,
    user_id: u64,
    username: String,
    start: NaiveDate,
    end: NaiveDate,
) {
    let Some(url) = email_api_url else {
        return;
    };

    actix_web::rt::spawn(async move {
        let body = serde_json::json!({
            "user_id": user_id,
            "subject": "You have requested a leave",
            "message": format!(
                "Hi {username}, your leave request from {start} to {end} has been submitted and is pending approval."
            ),
        });

        match HTTP.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(user_id, "leave email dispatched");
            }
            Ok(resp) => {
                tracing::warn!(user_id, status = %resp.status(), "leave email rejected");
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "leave email send failed");
            }
        }
    });
}
