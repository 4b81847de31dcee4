use crate::domain::board::{NoticeKind, NoticeRequest};
use crate::errors::ServerError;
use crate::mailings::Notifier;
use serde_json::json;

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            api_key,
            sender_email,
            sender_name,
        }
    }

    /// Recipient list for a notice: the responsible manager and the ASP
    /// contact, whichever are present. Empty when neither is filled in.
    fn recipients(notice: &NoticeRequest) -> Vec<&str> {
        [
            notice.record.rsm_email.as_str(),
            notice.record.asp_email_id.as_str(),
        ]
        .into_iter()
        .filter(|e| !e.trim().is_empty())
        .collect()
    }

    fn subject(notice: &NoticeRequest) -> String {
        let site = if notice.record.site_id.is_empty() {
            "(no site id)"
        } else {
            notice.record.site_id.as_str()
        };
        match notice.kind {
            NoticeKind::SoakStarted => format!("Soak started for site {site}"),
            NoticeKind::SiteCancelled => format!("Site {site} cancelled"),
        }
    }

    fn html_content(notice: &NoticeRequest) -> String {
        let r = &notice.record;
        let headline = match notice.kind {
            NoticeKind::SoakStarted => "has moved to the soak stage",
            NoticeKind::SiteCancelled => "has been cancelled",
        };
        format!(
            r#"
            <html>
                <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                        <h2>Site {site_id} {headline}</h2>
                        <table border="1" cellpadding="5">
                            <tr><td>Date</td><td>{date}</td></tr>
                            <tr><td>Project</td><td>{project}</td></tr>
                            <tr><td>SA</td><td>{sa}</td></tr>
                            <tr><td>Market</td><td>{market}</td></tr>
                            <tr><td>Signum</td><td>{signum}</td></tr>
                            <tr><td>ASP</td><td>{asp}</td></tr>
                            <tr><td>Comments</td><td>{comments}</td></tr>
                            <tr><td>RSM</td><td>{rsm}</td></tr>
                        </table>
                    </div>
                </body>
            </html>
            "#,
            site_id = r.site_id,
            headline = headline,
            date = r.date,
            project = r.project,
            sa = r.sa,
            market = r.market,
            signum = r.signum,
            asp = r.asp_name_number,
            comments = r.comments,
            rsm = r.rsm,
        )
    }
}

impl Notifier for BrevoMailer {
    fn notify(&self, notice: &NoticeRequest) -> Result<(), ServerError> {
        let recipients = Self::recipients(notice);
        if recipients.is_empty() {
            // Nobody to address: sending is a no-op, not an error.
            return Ok(());
        }

        let client = reqwest::blocking::Client::new();

        let to: Vec<_> = recipients.iter().map(|e| json!({ "email": e })).collect();
        let body = json!({
            "sender": {
                "name": self.sender_name,
                "email": self.sender_email
            },
            "to": to,
            "subject": Self::subject(notice),
            "htmlContent": Self::html_content(notice)
        });

        // Brevo's v3 API endpoint for transactional emails
        let response = client
            .post("https://api.brevo.com/v3/smtp/email")
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| ServerError::MailerError(format!("Failed to send email request: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().unwrap_or_else(|_| "(no body)".to_string());
            Err(ServerError::MailerError(format!(
                "Brevo API error: {status} - {text}"
            )))
        }
    }
}
