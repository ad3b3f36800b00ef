use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamError;

const SERVICE: &str = "hosted backend";

// PostgREST "no rows" code
pub const NO_ROWS: &str = "PGRST116";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    pub fn is_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    Signup,
    Recovery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(rename = "razorpay_payment_id", default)]
    pub gateway_payment_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: i64,
    pub region: String,
    pub currency: String,
    pub discounted_price: String,
    pub discount_percentage: f64,
    pub strike_through_price: String,
    pub savings: String,
    #[serde(rename = "razorpay_button_id")]
    pub button_id: String,
}

/// Auth and table access on the hosted backend-as-a-service.
#[async_trait]
pub trait HostedBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, UpstreamError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), UpstreamError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, UpstreamError>;

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, UpstreamError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), UpstreamError>;

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<Session, UpstreamError>;

    async fn username_taken(&self, username: &str) -> Result<bool, UpstreamError>;

    async fn profile(&self, access_token: &str, user_id: &str) -> Result<Option<Profile>, UpstreamError>;

    async fn insert_contact_message(&self, message: &ContactMessage) -> Result<(), UpstreamError>;

    async fn payment_history(&self, access_token: &str, user_id: &str) -> Result<Vec<Payment>, UpstreamError>;

    async fn pricing_plans(&self, region: Option<&str>) -> Result<Vec<PricingPlan>, UpstreamError>;
}

// Supabase-compatible REST client (GoTrue under /auth/v1, PostgREST under /rest/v1)
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(client: reqwest::Client, base_url: Url, anon_key: &str) -> Self {
        Self {
            client,
            base_url,
            anon_key: anon_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{}", self.base_url.path().trim_end_matches('/'), path));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: Url, access_token: Option<&str>) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
        let res = req
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;
        if res.status().is_success() {
            Ok(res)
        } else {
            Err(UpstreamError::from_response(SERVICE, res).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, UpstreamError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))
    }
}

#[async_trait]
impl HostedBackend for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, UpstreamError> {
        let url = self.endpoint("/auth/v1/token", &[("grant_type", "password")]);
        let req = self
            .request(reqwest::Method::POST, url, None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        self.send_json(req).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), UpstreamError> {
        let url = self.endpoint("/auth/v1/logout", &[]);
        self.send(self.request(reqwest::Method::POST, url, Some(access_token)))
            .await
            .map(|_| ())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, UpstreamError> {
        let url = self.endpoint("/auth/v1/user", &[]);
        self.send_json(self.request(reqwest::Method::GET, url, Some(access_token)))
            .await
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, UpstreamError> {
        let url = self.endpoint("/auth/v1/user", &[]);
        let req = self
            .request(reqwest::Method::PUT, url, Some(access_token))
            .json(update);
        self.send_json(req).await
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), UpstreamError> {
        let url = self.endpoint("/auth/v1/recover", &[("redirect_to", redirect_to)]);
        let req = self
            .request(reqwest::Method::POST, url, None)
            .json(&serde_json::json!({ "email": email }));
        self.send(req).await.map(|_| ())
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<Session, UpstreamError> {
        let url = self.endpoint("/auth/v1/verify", &[]);
        let req = self
            .request(reqwest::Method::POST, url, None)
            .json(&serde_json::json!({ "type": kind, "token_hash": token_hash }));
        self.send_json(req).await
    }

    async fn username_taken(&self, username: &str) -> Result<bool, UpstreamError> {
        let filter = format!("eq.{username}");
        let url = self.endpoint("/rest/v1/profiles", &[("select", "id"), ("username", &filter)]);
        let rows: Result<Vec<serde_json::Value>, _> =
            self.send_json(self.request(reqwest::Method::GET, url, None)).await;
        match rows {
            Ok(rows) => Ok(!rows.is_empty()),
            Err(e) if e.code() == Some(NO_ROWS) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn profile(&self, access_token: &str, user_id: &str) -> Result<Option<Profile>, UpstreamError> {
        let filter = format!("eq.{user_id}");
        let url = self.endpoint(
            "/rest/v1/profiles",
            &[("select", "full_name,username,phone"), ("id", &filter)],
        );
        let rows: Vec<Profile> = self
            .send_json(self.request(reqwest::Method::GET, url, Some(access_token)))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_contact_message(&self, message: &ContactMessage) -> Result<(), UpstreamError> {
        let url = self.endpoint("/rest/v1/contact_messages", &[]);
        let req = self
            .request(reqwest::Method::POST, url, None)
            .header("Prefer", "return=minimal")
            .json(&[message]);
        self.send(req).await.map(|_| ())
    }

    async fn payment_history(&self, access_token: &str, user_id: &str) -> Result<Vec<Payment>, UpstreamError> {
        let filter = format!("eq.{user_id}");
        let url = self.endpoint(
            "/rest/v1/payments",
            &[("select", "*"), ("user_id", &filter), ("order", "created_at.desc")],
        );
        self.send_json(self.request(reqwest::Method::GET, url, Some(access_token)))
            .await
    }

    async fn pricing_plans(&self, region: Option<&str>) -> Result<Vec<PricingPlan>, UpstreamError> {
        let filter = region.map(|r| format!("eq.{r}"));
        let mut query = vec![("select", "*")];
        if let Some(filter) = filter.as_deref() {
            query.push(("region", filter));
        }
        let url = self.endpoint("/rest/v1/monthly_pricing_fixed", &query);
        self.send_json(self.request(reqwest::Method::GET, url, None))
            .await
    }
}
