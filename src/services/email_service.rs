use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridEmail {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridPersonalization {
    pub to: Vec<SendGridEmail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridRequest {
    pub personalizations: Vec<SendGridPersonalization>,
    pub from: SendGridEmail,
    pub subject: String,
    pub content: Vec<SendGridContent>,
}

#[derive(Debug)]
pub enum EmailError {
    EnvironmentError(String),
    RequestError(String),
    ApiError(String),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
            EmailError::RequestError(err) => write!(f, "Request error: {}", err),
            EmailError::ApiError(err) => write!(f, "API error: {}", err),
        }
    }
}

impl std::error::Error for EmailError {}

/// Booking confirmation / cancellation notices via the SendGrid v3 REST API.
/// Delivery is best-effort: callers log failures and move on, a lost email
/// never fails a booking.
pub struct EmailService {
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new() -> Result<Self, EmailError> {
        let api_key = env::var("SENDGRID_API_KEY")
            .map_err(|_| EmailError::EnvironmentError("SENDGRID_API_KEY not set".to_string()))?;
        let from_email =
            env::var("BOOKING_FROM_EMAIL").unwrap_or_else(|_| "bookings@voyara.io".to_string());

        Ok(Self {
            api_key,
            from_email,
            client: reqwest::Client::new(),
        })
    }

    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailError> {
        let url = "https://api.sendgrid.com/v3/mail/send";

        let request = SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridEmail {
                    email: to_email.to_string(),
                }],
            }],
            from: SendGridEmail {
                email: self.from_email.clone(),
            },
            subject: subject.to_string(),
            content: vec![SendGridContent {
                content_type: "text/plain".to_string(),
                value: content.to_string(),
            }],
        };

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(EmailError::ApiError(format!(
                "Status: {}, Body: {}",
                status, body
            )))
        }
    }

    pub async fn send_booking_confirmation(
        &self,
        to_email: &str,
        reference: &str,
        total: &str,
        currency: &str,
    ) -> Result<(), EmailError> {
        let (subject, content) = confirmation_message(reference, total, currency);
        self.send_email(to_email, &subject, &content).await
    }

    pub async fn send_cancellation_notice(
        &self,
        to_email: &str,
        reference: &str,
    ) -> Result<(), EmailError> {
        let (subject, content) = cancellation_message(reference);
        self.send_email(to_email, &subject, &content).await
    }
}

fn confirmation_message(reference: &str, total: &str, currency: &str) -> (String, String) {
    let subject = format!("Booking {} confirmed", reference);
    let content = format!(
        "Thanks for booking with Voyara!\n\n\
         Your booking reference is {}.\n\
         Amount due: {} {}.\n\n\
         You can review or cancel your booking from your account page.",
        reference, total, currency
    );
    (subject, content)
}

fn cancellation_message(reference: &str) -> (String, String) {
    let subject = format!("Booking {} cancelled", reference);
    let content = format!(
        "Your booking {} has been cancelled.\n\
         If a payment was captured, the refund will follow separately.",
        reference
    );
    (subject, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_message_carries_reference_and_amount() {
        let (subject, content) = confirmation_message("RNT-K7Q2M9DX", "186.50", "USD");
        assert!(subject.contains("RNT-K7Q2M9DX"));
        assert!(content.contains("186.50 USD"));
    }

    #[test]
    fn cancellation_message_names_the_booking() {
        let (subject, content) = cancellation_message("EXC-K7Q2M9DX");
        assert!(subject.contains("EXC-K7Q2M9DX"));
        assert!(content.contains("cancelled"));
    }
}
