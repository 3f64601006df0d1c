//! Contact and RSVP form submission
//!
//! Forms post a JSON body to the serverless email function. On success the
//! fields are cleared and a success banner shown; on any failure the fields
//! are preserved so the user can resubmit. There is no automatic retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config;

/// The email function's request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.last_name.is_empty()
            && self.email.is_empty()
            && self.message.is_empty()
    }
}

/// RSVP form from the events page. The email function only understands the
/// four contact fields, so the extras are folded into the message text.
#[derive(Debug, Clone, Default)]
pub struct RsvpForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub event_title: String,
    pub phone: String,
    pub attendees: u32,
    pub dietary: String,
}

impl RsvpForm {
    pub fn into_contact(self) -> ContactForm {
        let mut message = format!(
            "RSVP for {}\nPhone: {}\nAttendees: {}",
            self.event_title, self.phone, self.attendees
        );
        if !self.dietary.is_empty() {
            message.push_str("\nDietary notes: ");
            message.push_str(&self.dietary);
        }
        ContactForm {
            name: self.name,
            last_name: self.last_name,
            email: self.email,
            message,
        }
    }
}

/// Why a submission failed. Network failure and a server rejection are
/// distinct states, though both surface as an inline error banner.
#[derive(Debug, Clone)]
pub enum SubmitError {
    /// Request never completed
    Network(String),
    /// Server answered with a non-success status
    Rejected { status: u16, message: String },
}

/// Successful reply from the email function
#[derive(Debug, Clone, Default)]
pub struct EndpointReply {
    pub message: String,
}

/// Seam for the email-sending endpoint, so the flow is testable without a
/// live function. `?Send` because the wasm fetch future holds JS handles
/// and everything runs on the main thread anyway.
#[async_trait(?Send)]
pub trait EmailEndpoint {
    async fn post(&self, form: &ContactForm) -> Result<EndpointReply, SubmitError>;
}

#[derive(Debug, Deserialize, Default)]
struct ReplyBody {
    #[serde(default)]
    message: String,
}

/// The real endpoint, posting to the configured serverless function
#[derive(Debug, Clone)]
pub struct HttpEmailEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpEmailEndpoint {
    pub fn new() -> Self {
        Self::with_url(config::get().email_endpoint.clone())
    }

    pub fn with_url(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

impl Default for HttpEmailEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl EmailEndpoint for HttpEmailEndpoint {
    async fn post(&self, form: &ContactForm) -> Result<EndpointReply, SubmitError> {
        let response = self
            .http
            .post(&self.url)
            .json(form)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        let body: ReplyBody = response.json().await.unwrap_or_default();
        if status.is_success() {
            Ok(EndpointReply {
                message: body.message,
            })
        } else {
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                message: body.message,
            })
        }
    }
}

/// Banner state next to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Sending,
    Success(String),
    Error(String),
}

const SUCCESS_MESSAGE: &str = "Message sent successfully! We'll get back to you soon.";
const REJECTED_MESSAGE: &str = "Failed to send message. Please try again.";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Field values plus the banner, owned by the page that renders the form
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: ContactForm,
    pub status: SubmitStatus,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            fields: ContactForm::default(),
            status: SubmitStatus::Idle,
        }
    }

    /// Post the current fields. Clears them only on success.
    pub async fn submit<E: EmailEndpoint + ?Sized>(&mut self, endpoint: &E) {
        self.status = SubmitStatus::Sending;
        match endpoint.post(&self.fields).await {
            Ok(_) => {
                self.fields = ContactForm::default();
                self.status = SubmitStatus::Success(SUCCESS_MESSAGE.to_string());
                log::info!("contact form submitted");
            }
            Err(SubmitError::Rejected { status, message }) => {
                log::error!("contact form rejected with status {status}");
                let banner = if message.is_empty() {
                    REJECTED_MESSAGE.to_string()
                } else {
                    message
                };
                self.status = SubmitStatus::Error(banner);
            }
            Err(SubmitError::Network(e)) => {
                log::error!("contact form network failure: {e}");
                self.status = SubmitStatus::Error(NETWORK_MESSAGE.to_string());
            }
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;

    #[async_trait(?Send)]
    impl EmailEndpoint for AcceptAll {
        async fn post(&self, _form: &ContactForm) -> Result<EndpointReply, SubmitError> {
            Ok(EndpointReply {
                message: "queued".into(),
            })
        }
    }

    struct RejectWith(u16, &'static str);

    #[async_trait(?Send)]
    impl EmailEndpoint for RejectWith {
        async fn post(&self, _form: &ContactForm) -> Result<EndpointReply, SubmitError> {
            Err(SubmitError::Rejected {
                status: self.0,
                message: self.1.to_string(),
            })
        }
    }

    struct NetworkDown;

    #[async_trait(?Send)]
    impl EmailEndpoint for NetworkDown {
        async fn post(&self, _form: &ContactForm) -> Result<EndpointReply, SubmitError> {
            Err(SubmitError::Network("connection refused".into()))
        }
    }

    fn filled_form() -> ContactForm {
        ContactForm {
            name: "Sam".into(),
            last_name: "Rivera".into(),
            email: "sam@example.org".into(),
            message: "Hello!".into(),
        }
    }

    #[tokio::test]
    async fn success_clears_fields_and_shows_banner() {
        let mut form = FormState::new();
        form.fields = filled_form();

        form.submit(&AcceptAll).await;

        assert!(form.fields.is_blank());
        assert!(matches!(form.status, SubmitStatus::Success(_)));
    }

    #[tokio::test]
    async fn rejection_preserves_fields_and_surfaces_server_message() {
        let mut form = FormState::new();
        form.fields = filled_form();

        form.submit(&RejectWith(500, "mailbox full")).await;

        assert_eq!(form.fields, filled_form());
        assert_eq!(form.status, SubmitStatus::Error("mailbox full".into()));
    }

    #[tokio::test]
    async fn rejection_without_message_uses_generic_banner() {
        let mut form = FormState::new();
        form.fields = filled_form();

        form.submit(&RejectWith(502, "")).await;

        assert_eq!(form.fields, filled_form());
        assert_eq!(form.status, SubmitStatus::Error(REJECTED_MESSAGE.into()));
    }

    #[tokio::test]
    async fn network_failure_preserves_fields() {
        let mut form = FormState::new();
        form.fields = filled_form();

        form.submit(&NetworkDown).await;

        assert_eq!(form.fields, filled_form());
        assert_eq!(form.status, SubmitStatus::Error(NETWORK_MESSAGE.into()));
    }

    // Endpoint whose future is !Send, like the fetch-backed wasm client
    struct SingleThreaded {
        posts: std::rc::Rc<std::cell::Cell<u32>>,
    }

    #[async_trait(?Send)]
    impl EmailEndpoint for SingleThreaded {
        async fn post(&self, _form: &ContactForm) -> Result<EndpointReply, SubmitError> {
            self.posts.set(self.posts.get() + 1);
            Ok(EndpointReply::default())
        }
    }

    #[tokio::test]
    async fn endpoint_futures_need_not_be_send() {
        let posts = std::rc::Rc::new(std::cell::Cell::new(0));
        let endpoint = SingleThreaded {
            posts: std::rc::Rc::clone(&posts),
        };
        let mut form = FormState::new();
        form.fields = filled_form();

        form.submit(&endpoint).await;

        assert_eq!(posts.get(), 1);
        assert!(matches!(form.status, SubmitStatus::Success(_)));
    }

    #[test]
    fn body_uses_camel_case_keys() {
        let json = serde_json::to_value(filled_form()).unwrap();
        assert!(json.get("lastName").is_some());
        assert!(json.get("last_name").is_none());
    }

    #[test]
    fn rsvp_folds_extras_into_message() {
        let rsvp = RsvpForm {
            name: "Sam".into(),
            last_name: "Rivera".into(),
            email: "sam@example.org".into(),
            event_title: "Fall Showcase".into(),
            phone: "555-0117".into(),
            attendees: 3,
            dietary: "vegetarian".into(),
        };
        let contact = rsvp.into_contact();
        assert!(contact.message.contains("Fall Showcase"));
        assert!(contact.message.contains("555-0117"));
        assert!(contact.message.contains("Attendees: 3"));
        assert!(contact.message.contains("vegetarian"));
        assert_eq!(contact.last_name, "Rivera");
    }
}
