//! Server-rendered HTML pages.
//!
//! Pages are assembled with plain string building. Every interpolated value
//! goes through [`html_escape`].

use crate::session::FlashMessage;
use crate::types::{Client, Profile, User};

const STYLES: &str = r#"
:root {
    --accent: #d9480f;
    --accent-light: #ff6b35;
    --danger: #c92a2a;
    --danger-bg: #fff5f5;
    --ok: #2b8a3e;
    --ok-bg: #ebfbee;
    --muted: #868e96;
    --surface: #ffffff;
    --page: #f1f3f5;
    --border: #dee2e6;
    --radius: 6px;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: var(--page);
    color: #212529;
    line-height: 1.5;
}

nav {
    display: flex;
    gap: 1rem;
    align-items: center;
    padding: 0.75rem 1.5rem;
    background: var(--surface);
    border-bottom: 1px solid var(--border);
}

nav .brand { font-weight: 700; color: var(--accent); margin-right: auto; text-decoration: none; }
nav a { color: #495057; text-decoration: none; font-size: 0.875rem; }

main { max-width: 640px; margin: 2rem auto; padding: 0 1rem; }

.card {
    background: var(--surface);
    border: 1px solid var(--border);
    border-radius: var(--radius);
    padding: 1.5rem;
    margin-bottom: 1rem;
}

h1 { font-size: 1.25rem; margin-bottom: 1rem; }

.field { margin-bottom: 0.875rem; }
.field label { display: block; font-size: 0.875rem; color: #495057; margin-bottom: 0.25rem; }
.field input {
    width: 100%;
    padding: 0.5rem 0.625rem;
    border: 1px solid var(--border);
    border-radius: var(--radius);
    font-size: 0.875rem;
}
.field input:focus { outline: none; border-color: var(--accent); }

button {
    padding: 0.5rem 1rem;
    border: none;
    border-radius: var(--radius);
    background: var(--accent);
    color: white;
    font-size: 0.875rem;
    cursor: pointer;
}
button:hover { background: var(--accent-light); }
button.link { background: transparent; color: var(--danger); padding: 0; }

.flash { padding: 0.625rem 0.875rem; border-radius: var(--radius); margin-bottom: 1rem; font-size: 0.875rem; }
.flash-error { background: var(--danger-bg); color: var(--danger); border: 1px solid var(--danger); }
.flash-success { background: var(--ok-bg); color: var(--ok); border: 1px solid var(--ok); }
.flash-info { background: var(--page); color: #495057; border: 1px solid var(--border); }

table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid var(--border); vertical-align: top; }
code { font-family: "SF Mono", Menlo, monospace; font-size: 0.8125rem; word-break: break-all; }
.muted { color: var(--muted); font-size: 0.875rem; }
"#;

/// Wraps page content in the common layout.
pub fn html_page(provider: &str, title: &str, signed_in: bool, content: &str) -> String {
    let provider = html_escape(provider);
    let mut html = String::with_capacity(content.len() + STYLES.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("    <title>");
    html.push_str(&html_escape(title));
    html.push_str(" - ");
    html.push_str(&provider);
    html.push_str("</title>\n    <style>");
    html.push_str(STYLES);
    html.push_str("</style>\n</head>\n<body>\n<nav>\n<a class=\"brand\" href=\"/\">");
    html.push_str(&provider);
    html.push_str("</a>\n");
    if signed_in {
        html.push_str("<a href=\"/clients\">Clients</a>\n<a href=\"/profile\">Profile</a>\n<a href=\"/logout\">Sign out</a>\n");
    } else {
        html.push_str("<a href=\"/login\">Sign in</a>\n<a href=\"/register\">Register</a>\n");
    }
    html.push_str("</nav>\n<main>\n");
    html.push_str(content);
    html.push_str("\n</main>\n</body>\n</html>");
    html
}

fn render_flashes(content: &mut String, flashes: &[FlashMessage]) {
    for flash in flashes {
        content.push_str("<div class=\"flash flash-");
        content.push_str(flash.kind.as_str());
        content.push_str("\">");
        content.push_str(&html_escape(&flash.text));
        content.push_str("</div>\n");
    }
}

fn render_error_line(content: &mut String, error: Option<&str>) {
    if let Some(e) = error {
        content.push_str("<div class=\"flash flash-error\">");
        content.push_str(&html_escape(e));
        content.push_str("</div>\n");
    }
}

fn render_field(content: &mut String, label: &str, kind: &str, name: &str, value: &str) {
    content.push_str("<div class=\"field\">\n<label for=\"");
    content.push_str(name);
    content.push_str("\">");
    content.push_str(label);
    content.push_str("</label>\n<input type=\"");
    content.push_str(kind);
    content.push_str("\" id=\"");
    content.push_str(name);
    content.push_str("\" name=\"");
    content.push_str(name);
    content.push_str("\" value=\"");
    content.push_str(&html_escape(value));
    content.push_str("\">\n</div>\n");
}

/// Sign-in form posting `login_username` and `login_password` to `action`.
pub fn render_login_form(provider: &str, action: &str, error: Option<&str>) -> String {
    let mut content = String::with_capacity(2048);
    content.push_str("<div class=\"card\">\n<h1>Sign in</h1>\n");
    render_error_line(&mut content, error);

    content.push_str("<form method=\"POST\" action=\"");
    content.push_str(&html_escape(action));
    content.push_str("\">\n");
    render_field(&mut content, "Username or email", "text", "login_username", "");
    render_field(&mut content, "Password", "password", "login_password", "");
    content.push_str("<button type=\"submit\">Sign in</button>\n</form>\n");
    content.push_str("<p class=\"muted\" style=\"margin-top: 1rem;\">No account? <a href=\"/register\">Register</a></p>\n");
    content.push_str("</div>");

    html_page(provider, "Sign in", false, &content)
}

/// Generic error page.
pub fn render_error_page(provider: &str, error_code: &str, error_description: &str) -> String {
    let mut content = String::with_capacity(512);
    content.push_str("<div class=\"card\">\n<h1>Something went wrong</h1>\n<p>");
    content.push_str(&html_escape(error_description));
    content.push_str("</p>\n<p class=\"muted\"><code>");
    content.push_str(&html_escape(error_code));
    content.push_str("</code></p>\n</div>");

    html_page(provider, "Error", false, &content)
}

pub fn render_home(provider: &str, user: Option<&User>, flashes: &[FlashMessage]) -> String {
    let mut content = String::with_capacity(1024);
    render_flashes(&mut content, flashes);
    content.push_str("<div class=\"card\">\n");
    match user {
        Some(user) => {
            content.push_str("<h1>Welcome back, ");
            content.push_str(&html_escape(&user.username));
            content.push_str("</h1>\n<p>Manage the applications allowed to sign in with your account on the <a href=\"/clients\">clients</a> page.</p>\n");
        }
        None => {
            content.push_str("<h1>");
            content.push_str(&html_escape(provider));
            content.push_str("</h1>\n<p>An OAuth 2.0 provider. <a href=\"/login\">Sign in</a> or <a href=\"/register\">create an account</a> to register applications.</p>\n");
        }
    }
    content.push_str("</div>");

    html_page(provider, "Home", user.is_some(), &content)
}

/// Registration form. `username` and `email` are echoed back after a
/// failed attempt.
pub fn render_register_form(provider: &str, username: &str, email: &str, error: Option<&str>) -> String {
    let mut content = String::with_capacity(2048);
    content.push_str("<div class=\"card\">\n<h1>Create an account</h1>\n");
    render_error_line(&mut content, error);

    content.push_str("<form method=\"POST\" action=\"/register\">\n");
    render_field(&mut content, "Username", "text", "register_username", username);
    render_field(&mut content, "Email", "email", "register_email", email);
    render_field(&mut content, "Password", "password", "register_password", "");
    render_field(&mut content, "Confirm password", "password", "register_confirm", "");
    content.push_str("<button type=\"submit\">Register</button>\n</form>\n</div>");

    html_page(provider, "Register", false, &content)
}

pub fn render_clients_page(provider: &str, clients: &[Client], flashes: &[FlashMessage]) -> String {
    let mut content = String::with_capacity(4096);
    render_flashes(&mut content, flashes);

    content.push_str("<div class=\"card\">\n<h1>Your clients</h1>\n");
    if clients.is_empty() {
        content.push_str("<p class=\"muted\">No clients registered yet.</p>\n");
    } else {
        content.push_str("<table>\n<tr><th>Name</th><th>Client id</th><th>Redirect</th><th></th></tr>\n");
        for client in clients {
            content.push_str("<tr><td>");
            content.push_str(&html_escape(&client.name));
            content.push_str("</td><td><code>");
            content.push_str(&html_escape(&client.uuid));
            content.push_str("</code></td><td><code>");
            content.push_str(&html_escape(&client.redirect_url));
            content.push_str("</code></td><td><form method=\"POST\" action=\"/clients/");
            content.push_str(&client.id.to_string());
            content.push_str("/delete\"><button class=\"link\" type=\"submit\">Delete</button></form></td></tr>\n");
        }
        content.push_str("</table>\n");
    }
    content.push_str("</div>\n");

    content.push_str("<div class=\"card\">\n<h1>Register a client</h1>\n<form method=\"POST\" action=\"/clients\">\n");
    render_field(&mut content, "Name", "text", "client_name", "");
    render_field(&mut content, "Redirect URL", "url", "redirect_url", "");
    render_field(&mut content, "Secret (leave empty to generate)", "text", "client_secret", "");
    content.push_str("<button type=\"submit\">Create</button>\n</form>\n</div>");

    html_page(provider, "Clients", true, &content)
}

pub fn render_profile(provider: &str, profile: &Profile, flashes: &[FlashMessage]) -> String {
    let mut content = String::with_capacity(1024);
    render_flashes(&mut content, flashes);

    content.push_str("<div class=\"card\">\n<h1>");
    content.push_str(&html_escape(&profile.display_name()));
    content.push_str("</h1>\n<table>\n");
    let rows = [
        ("Username", profile.username.as_str()),
        ("Email", profile.email.as_str()),
        ("First name", profile.first_name.as_str()),
        ("Last name", profile.last_name.as_str()),
        ("Avatar", profile.avatar_url.as_deref().unwrap_or("")),
    ];
    for (label, value) in rows {
        content.push_str("<tr><th>");
        content.push_str(label);
        content.push_str("</th><td>");
        content.push_str(&html_escape(value));
        content.push_str("</td></tr>\n");
    }
    content.push_str("</table>\n</div>");

    html_page(provider, "Profile", true, &content)
}

/// Escapes text for HTML bodies and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashKind;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_login_form_keeps_action() {
        let html = render_login_form("hero", "/authorize?client_id=abc&state=x", Some("Invalid credentials"));
        assert!(html.contains("action=\"/authorize?client_id=abc&amp;state=x\""));
        assert!(html.contains("name=\"login_username\""));
        assert!(html.contains("name=\"login_password\""));
        assert!(html.contains("Invalid credentials"));
    }

    #[test]
    fn test_login_form_without_error() {
        let html = render_login_form("hero", "/login", None);
        assert!(!html.contains("class=\"flash flash-error\""));
    }

    #[test]
    fn test_clients_page_escapes_names() {
        let client = Client::new("uuid-1", 1, "<script>", "hash").with_redirect_url("http://example.com");
        let html = render_clients_page("hero", &[client], &[]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("uuid-1"));
    }

    #[test]
    fn test_flashes_rendered() {
        let flashes = [FlashMessage {
            kind: FlashKind::Success,
            text: "Client created".into(),
        }];
        let html = render_home("hero", None, &flashes);
        assert!(html.contains("flash-success"));
        assert!(html.contains("Client created"));
    }

    #[test]
    fn test_error_page() {
        let html = render_error_page("hero", "conflict", "Username is taken");
        assert!(html.contains("Username is taken"));
        assert!(html.contains("<code>conflict</code>"));
    }
}
