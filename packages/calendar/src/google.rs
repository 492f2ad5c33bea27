// ABOUTME: Google Calendar notifier
// ABOUTME: Pushes workflow events to a configured calendar via the v3 API

use tracing::debug;

use planea_planning::workflow::notify::{CalendarNotification, CalendarNotifier, NotifyError};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/calendars";

pub struct GoogleCalendarNotifier {
    client: reqwest::Client,
    access_token: String,
    calendar_id: String,
}

impl GoogleCalendarNotifier {
    pub fn new(access_token: String, calendar_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            calendar_id,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/{}/events", CALENDAR_API, self.calendar_id)
    }
}

#[async_trait::async_trait]
impl CalendarNotifier for GoogleCalendarNotifier {
    async fn notify(&self, event: CalendarNotification) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": event.start.to_rfc3339() },
            "end": { "dateTime": event.end.to_rfc3339() },
        });

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(NotifyError::Request(format!(
                "Calendar insert returned {}",
                status
            )));
        }

        debug!("Calendar event created: {}", event.summary);
        Ok(())
    }
}
