use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::UpstreamError;
use crate::currency::Currency;

const SERVICE: &str = "booking api";

// where a lead came from; the backend uses it to pick the welcome mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    FreeClass,
    GetStarted,
    StickyHeader,
    AuthForm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "healthConditions", skip_serializing_if = "Option::is_none")]
    pub health_conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub source: LeadSource,
}

impl SignupRequest {
    pub fn lead(email: &str, name: &str, source: LeadSource) -> Self {
        Self {
            email: email.to_string(),
            name: name.to_string(),
            phone: None,
            health_conditions: None,
            interest: None,
            username: None,
            password: None,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLinkRequest {
    // minor units
    pub amount: i64,
    pub currency: Currency,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLinkResponse {
    pub payment_link: String,
}

#[derive(Deserialize)]
struct EmailExists {
    exists: bool,
}

/// The site's own backend: lead signup, email lookups, payment links.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> Result<(), UpstreamError>;

    async fn email_exists(&self, email: &str) -> Result<bool, UpstreamError>;

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, UpstreamError>;
}

pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, UpstreamError> {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        if res.status().is_success() {
            Ok(res)
        } else {
            Err(UpstreamError::from_response(SERVICE, res).await)
        }
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn signup(&self, request: &SignupRequest) -> Result<(), UpstreamError> {
        self.post_json("/api/auth/signup", request).await?;
        tracing::info!(source = ?request.source, "lead signed up");
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UpstreamError> {
        let res = self
            .post_json("/api/auth/check-email", &serde_json::json!({ "email": email }))
            .await?;
        let body: EmailExists = res
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;
        Ok(body.exists)
    }

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, UpstreamError> {
        let res = self.post_json("/api/payments/link", request).await?;
        res.json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_body_omits_missing_fields() {
        let mut req = SignupRequest::lead("a@x.com", "Asha", LeadSource::FreeClass);
        req.health_conditions = Some("knee injury".to_string());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "a@x.com",
                "name": "Asha",
                "healthConditions": "knee injury",
                "source": "free_class"
            })
        );
    }

    #[test]
    fn payment_link_body_uses_minor_units_and_code() {
        let req = PaymentLinkRequest {
            amount: 350_000,
            currency: Currency::Inr,
            user_id: "u-1".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amount"], 350_000);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["user_id"], "u-1");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpBookingApi::new(reqwest::Client::new(), "https://api.example.com/");
        assert_eq!(api.url("/api/auth/signup"), "https://api.example.com/api/auth/signup");
    }
}
