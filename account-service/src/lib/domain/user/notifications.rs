/// Email sent after self-registration carrying the verification link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub subject: String,
    pub html_body: String,
}

impl VerificationEmail {
    /// Render the verification message.
    ///
    /// # Arguments
    /// * `project_name` - Product name shown in subject and greeting
    /// * `recipient_name` - Display name of the new account
    /// * `link` - Absolute verification URL including the token
    /// * `valid_hours` - Token lifetime shown to the reader
    pub fn new(project_name: &str, recipient_name: &str, link: &str, valid_hours: i64) -> Self {
        let subject = format!("{project_name} - Verify Your Account");

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Verify Your Account</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #007bff;">Welcome to {project_name}, {recipient_name}!</h2>
        <p>Thank you for registering. To complete your registration and verify your email address, please click the button below.</p>
        <p>This link is valid for {valid_hours} hours.</p>
        <div style="text-align: center; margin: 30px 0;">
            <a href="{link}" style="background-color: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block;">Verify Your Account</a>
        </div>
        <p>If you did not create an account, no further action is required.</p>
        <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
        <p style="font-size: 14px; color: #666;">If you're having trouble clicking the button, copy and paste the URL below into your web browser:</p>
        <p style="font-size: 14px; color: #666; word-break: break-all;"><a href="{link}">{link}</a></p>
    </div>
</body>
</html>
"#,
            recipient_name = escape_html(recipient_name),
        );

        Self { subject, html_body }
    }
}

/// Message used to check that outbound mail works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEmail {
    pub subject: String,
    pub html_body: String,
}

impl TestEmail {
    pub fn new(project_name: &str, recipient: &str) -> Self {
        let subject = format!("{project_name} - Test Email");

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Test Email</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #007bff;">Test Email from {project_name}</h2>
        <p>This is a test email to verify that the email service is working correctly.</p>
        <p>If you received this email, the email configuration is working properly!</p>
        <p style="font-size: 14px; color: #666;">Sent to: {recipient}</p>
    </div>
</body>
</html>
"#,
            recipient = escape_html(recipient),
        );

        Self { subject, html_body }
    }
}

/// Build the public verification URL for `token`.
pub fn verification_link(server_host: &str, token: &str) -> String {
    format!(
        "{}/api/v1/verify-email?token={}",
        server_host.trim_end_matches('/'),
        token
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
