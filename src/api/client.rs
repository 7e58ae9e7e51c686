//! The todo-action client.
//!
//! One method per page action: fetch a todo's edit payload, save a
//! draft, mark done, mark KIV, delete. Mutating actions reply with a
//! small JSON status object except delete, which redirects back to the
//! list view; the client follows that redirect and reports success.

use reqwest::{header, Client};
use tracing::debug;

use crate::models::{ActionResponse, TodoDraft, TodoPayload};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Form field name the server's CSRF protection reads.
const CSRF_FIELD: &str = "_csrf_token";

/// Header the server's CSRF protection also accepts.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Where the page always navigates after a successful KIV, landing on
/// the undone view with the KIV tab active.
pub const KIV_REDIRECT: &str = "/undone?tab=kiv";

/// Client for the TodoBox endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct TodoClient {
    client: Client,
    base_url: String,
    csrf_token: String,
}

impl TodoClient {
    pub fn new(base_url: impl Into<String>, csrf_token: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: csrf_token.into(),
        })
    }

    /// Same connection pool, different CSRF token (tokens rotate per
    /// session).
    pub fn with_csrf_token(&self, csrf_token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            csrf_token: csrf_token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut form = vec![(CSRF_FIELD, self.csrf_token.clone())];
        form.extend(params);

        let response = self
            .client
            .post(self.endpoint(path))
            .header(CSRF_HEADER, self.csrf_token.as_str())
            .header(header::ACCEPT, "application/json, text/html")
            .form(&form)
            .send()
            .await?;

        Self::check_response(response).await
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    /// Fetch the edit payload for a todo (`POST /{id}/todo`).
    pub async fn fetch_todo(&self, todo_id: i64) -> Result<TodoPayload, ApiError> {
        debug!(todo_id, "Fetching edit payload");
        let response = self
            .post_form(&format!("/{}/todo", todo_id), Vec::new())
            .await?;
        let payload = response
            .json::<TodoPayload>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(payload)
    }

    /// Create or update a todo (`POST /add`). Returns the path the page
    /// navigates to on success, derived from the draft's schedule day.
    pub async fn save_todo(&self, draft: &TodoDraft) -> Result<&'static str, ApiError> {
        if draft.title.trim().is_empty() {
            return Err(ApiError::InvalidRequest("todo title is required".into()));
        }

        debug!(todo_id = ?draft.todo_id, title = %draft.title, "Saving todo");
        self.post_form("/add", draft.form_params()).await?;
        Ok(draft.redirect_target())
    }

    async fn status_action(&self, todo_id: i64, action: &str) -> Result<ActionResponse, ApiError> {
        let response = self
            .post_form(&format!("/{}/{}", todo_id, action), Vec::new())
            .await?;
        let action_response = response
            .json::<ActionResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        if !action_response.is_success() {
            return Err(ApiError::InvalidResponse(
                action_response
                    .message
                    .unwrap_or_else(|| "action reported failure".to_string()),
            ));
        }
        Ok(action_response)
    }

    /// Mark a todo done (`POST /{id}/done`).
    pub async fn mark_done(&self, todo_id: i64) -> Result<ActionResponse, ApiError> {
        debug!(todo_id, "Marking todo done");
        self.status_action(todo_id, "done").await
    }

    /// Mark a todo KIV (`POST /{id}/kiv`). On success the page always
    /// navigates to [`KIV_REDIRECT`].
    pub async fn mark_kiv(&self, todo_id: i64) -> Result<ActionResponse, ApiError> {
        debug!(todo_id, "Marking todo KIV");
        self.status_action(todo_id, "kiv").await
    }

    /// Delete a todo (`POST /{id}/delete`). The server answers with a
    /// redirect to the list view; reaching it counts as success.
    pub async fn delete_todo(&self, todo_id: i64) -> Result<(), ApiError> {
        debug!(todo_id, "Deleting todo");
        self.post_form(&format!("/{}/delete", todo_id), Vec::new())
            .await?;
        Ok(())
    }
}
