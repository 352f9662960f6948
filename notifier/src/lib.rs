use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use redwatch_core::NotifyError;
use tracing::info;

/// Outbound alert delivery. A `NotifyError` means the message may or may
/// not have gone out; callers must not mark the item as recorded.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends one plain-text email per call over authenticated SMTP (STARTTLS)
/// to a single configured recipient.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(
        smtp_host: &str,
        user: &str,
        password: &str,
        recipient: &str,
    ) -> Result<Self, NotifyError> {
        let from = parse_mailbox(user)?;
        let to = parse_mailbox(recipient)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(message).await?;
        info!("Notification sent to {}", self.to);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|_| NotifyError::InvalidAddress {
        address: address.to_string(),
    })
}
