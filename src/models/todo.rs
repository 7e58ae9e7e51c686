use serde::{Deserialize, Serialize};

/// Todo lifecycle status, with the tracker codes the server records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    Pending,
    Done,
    Kiv,
}

impl TodoStatus {
    /// Tracker status code as stored server-side.
    pub fn tracker_code(&self) -> u8 {
        match self {
            TodoStatus::Pending => 5,
            TodoStatus::Done => 6,
            TodoStatus::Kiv => 9,
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TodoStatus::Pending => write!(f, "Pending"),
            TodoStatus::Done => write!(f, "Done"),
            TodoStatus::Kiv => write!(f, "KIV"),
        }
    }
}

/// The edit payload returned by `POST /{id}/todo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoPayload {
    pub status: String,
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub activities: Option<String>,
    pub modified: Option<String>,
    #[serde(default)]
    pub reminder_enabled: bool,
    // YYYY-MM-DDTHH:MM in the user's timezone, ready for the picker
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub reminder_sent: bool,
}

/// Reply to a mutating action (`/{id}/done`, `/{id}/kiv`, `/{id}/delete`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    #[serde(default)]
    pub todo_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.status == "Success"
    }
}

/// Which day a todo is scheduled for when saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleDay {
    #[default]
    Today,
    Tomorrow,
    Custom,
}

impl ScheduleDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleDay::Today => "today",
            ScheduleDay::Tomorrow => "tomorrow",
            ScheduleDay::Custom => "custom",
        }
    }

    /// Where the page navigates after a successful save. Today and
    /// tomorrow land on their list views; custom dates land on the
    /// dashboard, which shows everything.
    pub fn redirect_target(&self) -> &'static str {
        match self {
            ScheduleDay::Today => "/today/list",
            ScheduleDay::Tomorrow => "/tomorrow/list",
            ScheduleDay::Custom => "/dashboard",
        }
    }
}

/// Unit for "remind me N before" reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderUnit {
    Minutes,
    Hours,
    Days,
}

impl ReminderUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderUnit::Minutes => "minutes",
            ReminderUnit::Hours => "hours",
            ReminderUnit::Days => "days",
        }
    }
}

/// The two reminder shapes the form offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderKind {
    /// A fixed datetime, YYYY-MM-DDTHH:MM.
    At(String),
    /// An offset before the todo's scheduled time.
    Before { amount: u32, unit: ReminderUnit },
}

/// Reminder form state for a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub kind: Option<ReminderKind>,
}

impl ReminderSettings {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn at(datetime: impl Into<String>) -> Self {
        Self {
            enabled: true,
            kind: Some(ReminderKind::At(datetime.into())),
        }
    }

    pub fn before(amount: u32, unit: ReminderUnit) -> Self {
        Self {
            enabled: true,
            kind: Some(ReminderKind::Before { amount, unit }),
        }
    }
}

/// Everything the `/add` handler reads from the save form. A draft with
/// a `todo_id` updates that todo; without one it creates a new todo.
#[derive(Debug, Clone, Default)]
pub struct TodoDraft {
    pub todo_id: Option<i64>,
    pub title: String,
    pub activities: String,
    pub schedule_day: ScheduleDay,
    pub custom_date: Option<String>,
    pub reminder: ReminderSettings,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Post-save navigation target, derived from the schedule day the
    /// same way the save form did.
    pub fn redirect_target(&self) -> &'static str {
        self.schedule_day.redirect_target()
    }

    /// Form fields exactly as the server's `/add` handler reads them.
    /// The CSRF token is appended by the client, not here.
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "todo_id",
                self.todo_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("title", self.title.clone()),
            ("activities", self.activities.clone()),
            ("schedule_day", self.schedule_day.as_str().to_string()),
            ("custom_date", self.custom_date.clone().unwrap_or_default()),
            ("reminder_enabled", self.reminder.enabled.to_string()),
        ];

        if self.reminder.enabled {
            match &self.reminder.kind {
                Some(ReminderKind::At(datetime)) => {
                    params.push(("reminder_type", "custom".to_string()));
                    params.push(("reminder_datetime", datetime.clone()));
                }
                Some(ReminderKind::Before { amount, unit }) => {
                    params.push(("reminder_type", "before".to_string()));
                    params.push(("reminder_before_minutes", amount.to_string()));
                    params.push(("reminder_before_unit", unit.as_str().to_string()));
                }
                None => {}
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(params: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_edit_payload_parses_wire_json() {
        let json = r#"{
            "status": "Success",
            "id": 42,
            "title": "Renew passport",
            "activities": "- book appointment",
            "modified": "Mon, 03 Aug 2026 10:00:00 GMT",
            "button": "<button>Save</button>",
            "reminder_enabled": true,
            "reminder_time": "2026-08-07T09:30",
            "reminder_sent": false
        }"#;
        let payload: TodoPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.id, 42);
        assert_eq!(payload.title, "Renew passport");
        assert!(payload.reminder_enabled);
        assert_eq!(payload.reminder_time.as_deref(), Some("2026-08-07T09:30"));
    }

    #[test]
    fn test_action_response_success() {
        let ok: ActionResponse =
            serde_json::from_str(r#"{"status": "Success", "todo_id": 7}"#).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.todo_id, Some(7));

        let err: ActionResponse =
            serde_json::from_str(r#"{"status": "Error", "message": "Todo not found"}"#).unwrap();
        assert!(!err.is_success());
    }

    #[test]
    fn test_draft_form_params_create() {
        let draft = TodoDraft::new("Water the plants");
        let params = draft.form_params();

        assert_eq!(field(&params, "todo_id"), Some(""));
        assert_eq!(field(&params, "title"), Some("Water the plants"));
        assert_eq!(field(&params, "schedule_day"), Some("today"));
        assert_eq!(field(&params, "reminder_enabled"), Some("false"));
        assert_eq!(field(&params, "reminder_type"), None);
    }

    #[test]
    fn test_draft_form_params_update_with_custom_reminder() {
        let draft = TodoDraft {
            todo_id: Some(42),
            title: "Renew passport".into(),
            activities: "- book appointment".into(),
            schedule_day: ScheduleDay::Custom,
            custom_date: Some("2026-08-20".into()),
            reminder: ReminderSettings::at("2026-08-19T09:00"),
        };
        let params = draft.form_params();

        assert_eq!(field(&params, "todo_id"), Some("42"));
        assert_eq!(field(&params, "schedule_day"), Some("custom"));
        assert_eq!(field(&params, "custom_date"), Some("2026-08-20"));
        assert_eq!(field(&params, "reminder_enabled"), Some("true"));
        assert_eq!(field(&params, "reminder_type"), Some("custom"));
        assert_eq!(field(&params, "reminder_datetime"), Some("2026-08-19T09:00"));
    }

    #[test]
    fn test_draft_form_params_before_reminder() {
        let mut draft = TodoDraft::new("Standup prep");
        draft.reminder = ReminderSettings::before(15, ReminderUnit::Minutes);
        let params = draft.form_params();

        assert_eq!(field(&params, "reminder_type"), Some("before"));
        assert_eq!(field(&params, "reminder_before_minutes"), Some("15"));
        assert_eq!(field(&params, "reminder_before_unit"), Some("minutes"));
    }

    #[test]
    fn test_redirect_targets_follow_schedule_day() {
        assert_eq!(ScheduleDay::Today.redirect_target(), "/today/list");
        assert_eq!(ScheduleDay::Tomorrow.redirect_target(), "/tomorrow/list");
        assert_eq!(ScheduleDay::Custom.redirect_target(), "/dashboard");
    }

    #[test]
    fn test_tracker_codes() {
        assert_eq!(TodoStatus::Pending.tracker_code(), 5);
        assert_eq!(TodoStatus::Done.tracker_code(), 6);
        assert_eq!(TodoStatus::Kiv.tracker_code(), 9);
    }
}
