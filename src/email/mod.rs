use anyhow::{Context, Result};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::Config;

/// SMTP 邮件服务，启动时构建一次传输器
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("invalid SMTP host")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from: Mailbox = format!("{} <{}>", config.smtp_from_name, config.smtp_username)
            .parse()
            .context("invalid SMTP from address")?;

        Ok(Self { mailer, from })
    }

    pub async fn send_mail(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let to: Mailbox = to.parse().context("invalid recipient address")?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        self.mailer.send(email).await.context("SMTP send failed")?;

        Ok(())
    }
}
