use crate::config::EnvironmentConfig;
use crate::utils::errors::{internal_error, AppError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Contenido estructurado del correo de confirmación de cobro.
#[derive(Debug, Clone)]
pub struct TransactionEmail {
    pub to: String,
    pub subject: String,
    pub description: String,
    pub car_name: String,
    pub booking_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub total_gst: Decimal,
    pub amount_paid: Decimal,
    pub booking_status: String,
}

impl TransactionEmail {
    fn html_body(&self) -> String {
        format!(
            "<h1>{}</h1>\n\
             <p>{}</p>\n\
             <p><strong>Car Name:</strong> {}</p>\n\
             <p><strong>Booking Date:</strong> {}</p>\n\
             <p><strong>Start date:</strong> {}</p>\n\
             <p><strong>End date:</strong> {}</p>\n\
             <p><strong>Total Amount:</strong> ₹{}</p>\n\
             <p><strong>Total GST:</strong> ₹{}</p>\n\
             <p><strong>Amount Paid:</strong> ₹{}</p>\n\
             <p><strong>Booking Status:</strong> {}</p>",
            self.subject,
            self.description,
            self.car_name,
            self.booking_date.format("%Y-%m-%d %H:%M"),
            self.start_date.format("%Y-%m-%d %H:%M"),
            self.end_date.format("%Y-%m-%d %H:%M"),
            self.total_amount,
            self.total_gst,
            self.amount_paid,
            self.booking_status,
        )
    }
}

/// Salida de notificaciones. Los llamadores registran los fallos y siguen:
/// un correo caído nunca tumba una reserva ni un cobro.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;

    async fn send_transaction_email(&self, email: &TransactionEmail) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EnvironmentConfig) -> Result<Self, AppError> {
        let host = config
            .smtp_host
            .clone()
            .ok_or_else(|| internal_error("SMTP_HOST is not set"))?;
        let username = config
            .smtp_username
            .clone()
            .ok_or_else(|| internal_error("SMTP_USERNAME is not set"))?;
        let password = config
            .smtp_password
            .clone()
            .ok_or_else(|| internal_error("SMTP_PASSWORD is not set"))?;
        let from_address = config.smtp_from.clone().unwrap_or_else(|| username.clone());

        let from: Mailbox = from_address
            .parse()
            .map_err(|e| internal_error(&format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| internal_error(&format!("Failed to create SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(username, password))
            .build();

        log::info!("📧 SMTP mailer ready on {}:{}", host, config.smtp_port);

        Ok(Self { transport, from })
    }

    fn build_message(
        &self,
        to: &str,
        subject: &str,
        body: String,
        content_type: ContentType,
    ) -> Result<Message, AppError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|e| internal_error(&format!("Invalid recipient address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(content_type)
            .body(body)
            .map_err(|e| internal_error(&format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let message = self.build_message(to, subject, body.to_string(), ContentType::TEXT_PLAIN)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to send email: {}", e)))?;

        log::info!("📧 Email '{}' sent to {}", subject, to);
        Ok(())
    }

    async fn send_transaction_email(&self, email: &TransactionEmail) -> Result<(), AppError> {
        let message = self.build_message(
            &email.to,
            &email.subject,
            email.html_body(),
            ContentType::TEXT_HTML,
        )?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to send email: {}", e)))?;

        log::info!("📧 Transaction email sent to {}", email.to);
        Ok(())
    }
}

/// Sustituto cuando el SMTP no está configurado; solo deja rastro en el log.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), AppError> {
        log::info!("📧 [noop] Dropping email '{}' for {}", subject, to);
        Ok(())
    }

    async fn send_transaction_email(&self, email: &TransactionEmail) -> Result<(), AppError> {
        log::info!("📧 [noop] Dropping transaction email for {}", email.to);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer de pruebas; guarda los envíos en memoria para poder afirmarlos.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.sent.lock().await.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_transaction_email(&self, email: &TransactionEmail) -> Result<(), AppError> {
        self.sent.lock().await.push(SentEmail {
            to: email.to.clone(),
            subject: email.subject.clone(),
            body: email.html_body(),
        });
        Ok(())
    }
}

/// Elige la implementación según la configuración: SMTP real o registro.
pub fn build_mailer(config: &EnvironmentConfig) -> Arc<dyn Mailer> {
    if config.smtp_configured() {
        match SmtpMailer::new(config) {
            Ok(mailer) => return Arc::new(mailer),
            Err(e) => {
                log::warn!("⚠️ SMTP mailer unavailable ({}), falling back to log-only", e);
            }
        }
    } else if config.is_production() {
        log::warn!("⚠️ SMTP sin configurar en producción, los correos solo se registran");
    }

    Arc::new(NoopMailer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> TransactionEmail {
        TransactionEmail {
            to: "driver@example.com".to_string(),
            subject: "Transaction Completed".to_string(),
            description: "Your booking transaction was successful.".to_string(),
            car_name: "Swift Dzire".to_string(),
            booking_date: Utc::now(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            total_amount: Decimal::new(100_000, 2),
            total_gst: Decimal::new(72_000, 2),
            amount_paid: Decimal::new(172_000, 2),
            booking_status: "Confirmed".to_string(),
        }
    }

    #[test]
    fn transaction_email_keeps_the_billing_layout() {
        let body = sample_email().html_body();

        assert!(body.starts_with("<h1>Transaction Completed</h1>"));
        assert!(body.contains("<strong>Car Name:</strong> Swift Dzire"));
        assert!(body.contains("<strong>Total Amount:</strong> ₹1000.00"));
        assert!(body.contains("<strong>Total GST:</strong> ₹720.00"));
        assert!(body.contains("<strong>Amount Paid:</strong> ₹1720.00"));
        assert!(body.contains("<strong>Booking Status:</strong> Confirmed"));
    }

    #[tokio::test]
    async fn mock_mailer_records_every_send() {
        let mailer = MockMailer::new();

        mailer
            .send_email("a@example.com", "Booking Reminder", "24 hours left")
            .await
            .unwrap();
        mailer.send_transaction_email(&sample_email()).await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "Booking Reminder");
        assert_eq!(sent[1].to, "driver@example.com");
    }
}
