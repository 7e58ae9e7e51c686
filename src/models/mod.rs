//! Data models for TodoBox wire payloads.
//!
//! These mirror what the server actually sends and what its form
//! handlers read:
//!
//! - `TodoPayload`: the edit-fetch JSON for a single todo
//! - `ActionResponse`: the `{status, todo_id}` reply to done/KIV/delete
//! - `TodoDraft` and friends: the `/add` form fields for create/update

pub mod todo;

pub use todo::{
    ActionResponse, ReminderKind, ReminderSettings, ReminderUnit, ScheduleDay, TodoDraft,
    TodoPayload, TodoStatus,
};
