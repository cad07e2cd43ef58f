//! Email notifications for quotations, confirmations and rejections

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::TrainingRequest,
};

/// Outbound notification sink. Senders treat failures as fire-and-log; the
/// confirmation latch in the scheduler is only written after a send returns
/// `Ok`, so a failed confirmation email is retried on the next poll sweep.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_quotation(&self, request: &TrainingRequest) -> AppResult<()>;

    async fn send_confirmation(
        &self,
        request: &TrainingRequest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<()>;

    async fn send_rejection(&self, request: &TrainingRequest, reason: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Generic email sending function
    fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Spindle Training");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    /// Echo the quotation and reference code back to the client at intake
    async fn send_quotation(&self, request: &TrainingRequest) -> AppResult<()> {
        let subject = format!("Your training quotation {}", request.reference_code);
        let body = format!(
            r#"
Hello {contact},

Thank you for your training request. Your reference code is {reference}.

Training ({days} day(s)):  {training} USD
Travel costs:              {travel} USD
Total:                     {total} USD

Your assigned technician is {technician}. You can now pick preferred
training dates; we will hold them in our team calendar until the booking
is confirmed.
"#,
            contact = request.contact_name,
            reference = request.reference_code,
            days = request.training_days,
            training = request.training_price,
            travel = request.travel_cost,
            total = request.total_price,
            technician = request.assigned_technician,
        );
        self.send_email(&request.email, &subject, &body)
    }

    async fn send_confirmation(
        &self,
        request: &TrainingRequest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<()> {
        let subject = format!("Training {} confirmed", request.reference_code);
        let body = format!(
            r#"
Hello {contact},

Your training dates are confirmed: {start} through {end}.

{technician} will be on site at {address}, {city} {state}.

Reference: {reference}
"#,
            contact = request.contact_name,
            start = start,
            end = end,
            technician = request.assigned_technician,
            address = request.address,
            city = request.city,
            state = request.state,
            reference = request.reference_code,
        );
        self.send_email(&request.email, &subject, &body)
    }

    async fn send_rejection(&self, request: &TrainingRequest, reason: &str) -> AppResult<()> {
        let subject = format!("Training request {} could not be scheduled", request.reference_code);
        let body = format!(
            r#"
Hello {contact},

Unfortunately your training request {reference} was not scheduled:

  {reason}

Please get in touch to discuss alternatives.
"#,
            contact = request.contact_name,
            reference = request.reference_code,
            reason = reason,
        );
        self.send_email(&request.email, &subject, &body)
    }
}
