//! Async HTTP client wrapping the habit tracker JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use habit_core::{
  habit::{Habit, HabitCheck},
  user::PublicUser,
  weekly::WeeklyHabit,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    Option<String>,
}

/// `{token, user}` returned by register and login.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  PublicUser,
}

/// `{habit_id, date, checked}` echoed by a check write.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckAck {
  pub habit_id: String,
  pub date:     String,
  pub checked:  bool,
}

#[derive(Debug, Deserialize)]
struct Message {
  message: String,
}

#[derive(Serialize)]
struct WeeklyUpdate<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  name:      Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  completed: Option<bool>,
}

/// Async HTTP client for the habit tracker REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    decode(resp, what).await
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/register`
  pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session> {
    let body = json!({ "username": username, "email": email, "password": password });
    self
      .send(self.request(Method::POST, "/auth/register").json(&body), "POST /auth/register")
      .await
  }

  /// `POST /api/auth/login`
  pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
    let body = json!({ "email": email, "password": password });
    self
      .send(self.request(Method::POST, "/auth/login").json(&body), "POST /auth/login")
      .await
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  /// `GET /api/habits`
  pub async fn list_habits(&self) -> Result<Vec<Habit>> {
    self.send(self.request(Method::GET, "/habits"), "GET /habits").await
  }

  /// `POST /api/habits`
  pub async fn create_habit(&self, id: &str, name: &str) -> Result<Habit> {
    let body = json!({ "id": id, "name": name });
    self.send(self.request(Method::POST, "/habits").json(&body), "POST /habits").await
  }

  /// `PUT /api/habits/:id`
  pub async fn rename_habit(&self, id: &str, name: &str) -> Result<()> {
    let _: Value = self
      .send(
        self.request(Method::PUT, &format!("/habits/{id}")).json(&json!({ "name": name })),
        "PUT /habits/:id",
      )
      .await?;
    Ok(())
  }

  /// `DELETE /api/habits/:id`
  pub async fn delete_habit(&self, id: &str) -> Result<String> {
    let msg: Message = self
      .send(self.request(Method::DELETE, &format!("/habits/{id}")), "DELETE /habits/:id")
      .await?;
    Ok(msg.message)
  }

  /// `POST /api/habits/:id/check`
  pub async fn set_check(&self, id: &str, date: &str, checked: bool) -> Result<CheckAck> {
    let body = json!({ "date": date, "checked": checked });
    self
      .send(
        self.request(Method::POST, &format!("/habits/{id}/check")).json(&body),
        "POST /habits/:id/check",
      )
      .await
  }

  /// `GET /api/habits/:id/checks`
  pub async fn list_checks(&self, id: &str) -> Result<Vec<HabitCheck>> {
    self
      .send(self.request(Method::GET, &format!("/habits/{id}/checks")), "GET /habits/:id/checks")
      .await
  }

  // ── Weekly habits ─────────────────────────────────────────────────────────

  /// `GET /api/weekly-habits`
  pub async fn list_weekly(&self) -> Result<Vec<WeeklyHabit>> {
    self.send(self.request(Method::GET, "/weekly-habits"), "GET /weekly-habits").await
  }

  /// `POST /api/weekly-habits`
  pub async fn create_weekly(&self, id: &str, week: i64, name: &str) -> Result<WeeklyHabit> {
    let body = json!({ "id": id, "week": week, "name": name });
    self
      .send(self.request(Method::POST, "/weekly-habits").json(&body), "POST /weekly-habits")
      .await
  }

  /// `PUT /api/weekly-habits/:id` — only the given fields change.
  pub async fn update_weekly(
    &self,
    id:        &str,
    name:      Option<&str>,
    completed: Option<bool>,
  ) -> Result<()> {
    let _: Value = self
      .send(
        self
          .request(Method::PUT, &format!("/weekly-habits/{id}"))
          .json(&WeeklyUpdate { name, completed }),
        "PUT /weekly-habits/:id",
      )
      .await?;
    Ok(())
  }

  /// `DELETE /api/weekly-habits/:id`
  pub async fn delete_weekly(&self, id: &str) -> Result<String> {
    let msg: Message = self
      .send(
        self.request(Method::DELETE, &format!("/weekly-habits/{id}")),
        "DELETE /weekly-habits/:id",
      )
      .await?;
    Ok(msg.message)
  }
}

/// Decode a success body, or surface the server's `{"error"}` text.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let detail = resp
      .json::<Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
      .unwrap_or_default();
    return Err(anyhow!("{what} → {status}: {detail}"));
  }
  resp.json().await.with_context(|| format!("decoding {what} response"))
}
