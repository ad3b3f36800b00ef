use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutOutcome;
use crate::clients::{AuthUser, LeadSource, Session};
use crate::schedule::SessionWindow;

// Free class booking dialog
#[derive(Deserialize, Clone, Debug)]
pub struct FreeClassRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default, alias = "healthConditions")]
    pub health_conditions: Option<String>,
    // free_class (default) or get_started
    #[serde(default)]
    pub source: Option<LeadSource>,
}

// Sticky "join our community" form
#[derive(Deserialize, Clone, Debug)]
pub struct CommunityRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub interest: Option<String>,
}

// Contact form and the email relay share this shape
#[derive(Deserialize, Clone, Debug)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default, rename = "userId", alias = "user_id")]
    pub user_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
    #[serde(default)]
    pub agree_to_terms: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VerifyRequest {
    pub token_hash: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PaymentLinkForm {
    // major units, converted before leaving the gateway
    pub amount: f64,
    pub currency: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PricingQuery {
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CloseRequest {
    #[serde(default = "default_outcome")]
    pub outcome: CheckoutOutcome,
}

fn default_outcome() -> CheckoutOutcome {
    CheckoutOutcome::Closed
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct EmailExistsResponse {
    pub exists: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct SigninResponse {
    pub message: String,
    pub session: Session,
}

#[derive(Serialize, Clone, Debug)]
pub struct SessionResponse {
    pub user: AuthUser,
}

#[derive(Serialize, Clone, Debug)]
pub struct VerifyResponse {
    pub message: String,
    pub redirect: String,
    pub session: Session,
}

#[derive(Serialize, Clone, Debug)]
pub struct PaymentLinkBody {
    pub payment_link: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct DashboardUser {
    pub id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub initials: String,
    pub username: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct PaymentRow {
    pub id: String,
    pub gateway_payment_id: Option<String>,
    pub order_id: Option<String>,
    pub status: String,
    pub status_label: String,
    pub amount: f64,
    pub currency: String,
    pub currency_symbol: String,
    pub payment_method: Option<String>,
    pub created_at: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ClassLink {
    pub title: &'static str,
    pub description: &'static str,
    pub link: String,
    pub meeting_type: &'static str,
}

#[derive(Serialize, Clone, Debug)]
pub struct DashboardResponse {
    pub user: DashboardUser,
    pub payments: Vec<PaymentRow>,
    pub class_links: Vec<ClassLink>,
    pub session_times: Vec<SessionWindow>,
    // RFC 3339 in Berlin time; absent while a session is running
    pub next_session: Option<String>,
}
