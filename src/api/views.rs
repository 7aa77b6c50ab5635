//! HTML rendering for the browser-facing pages.
//!
//! Plain `format!` templates. All interpolated request data goes through
//! [`html_escape`] to prevent XSS.

const PAGE_STYLE: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; padding-top: 48px; }
.card { background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 480px; width: 100%; }
h1 { font-size: 20px; margin: 0 0 8px; color: #333; }
.subtitle { color: #666; font-size: 14px; margin: 0 0 24px; }
label { display: block; font-size: 14px; margin-bottom: 6px; color: #333; }
input[type="email"], input[type="number"] { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }
button { padding: 10px 16px; background: #4a90d9; color: #fff; border: none; border-radius: 4px; font-size: 14px; cursor: pointer; margin-top: 16px; }
button:hover { background: #357abd; }
.alert { background: #fee; border: 1px solid #c00; color: #c00; padding: 10px; border-radius: 4px; margin-bottom: 16px; }
code { word-break: break-all; background: #f0f0f0; padding: 2px 4px; border-radius: 3px; }
ul { padding-left: 20px; }
a { color: #3273dc; }"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>{PAGE_STYLE}</style>
</head>
<body>
<div class="card">
{body}
</div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Signup page. `alert` is a pre-built banner message (already plain text).
pub fn home_page(alert: Option<&str>, permissions: &[(&str, &str)]) -> String {
    let alert_html = alert
        .map(|msg| format!(r#"<div class="alert">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    let checkboxes: String = permissions
        .iter()
        .map(|(claim, label)| {
            format!(
                r#"<label><input type="checkbox" name="permissions" value="{claim}"> {label}</label>
"#,
                claim = html_escape(claim),
                label = html_escape(label),
            )
        })
        .collect();

    page(
        "JWT Experience",
        &format!(
            r#"<h1>JWT Experience</h1>
<p class="subtitle">Pick the claims you want baked into your session token.</p>
{alert_html}
<form method="POST" action="/request-login">
<label for="email">Email</label>
<input type="email" id="email" name="email" required autofocus>
<label for="expire_in">Token lifetime (minutes)</label>
<input type="number" id="expire_in" name="expire_in" value="60" min="1" required>
<fieldset style="border:none;padding:0;margin:16px 0 0">
<legend style="font-size:14px;color:#333">Permissions</legend>
{checkboxes}</fieldset>
<button type="submit">Email me a login link</button>
</form>"#
        ),
    )
}

pub fn thanks_page(email: &str) -> String {
    page(
        "Check your email",
        &format!(
            r#"<h1>Thanks for joining</h1>
<p class="subtitle">If <strong>{email}</strong> is valid, we have sent a sign-in link. It expires in five minutes.</p>
<a href="/">Back to signup</a>"#,
            email = html_escape(email),
        ),
    )
}

pub fn logged_in_page(username: &str, permissions: &[String]) -> String {
    let held: String = permissions
        .iter()
        .map(|p| format!("<li><code>{}</code></li>\n", html_escape(p)))
        .collect();

    page(
        "Logged in",
        &format!(
            r##"<h1>You are logged in</h1>
<p class="subtitle">Session for <strong>{username}</strong>.</p>
<h4>Your permissions</h4>
<ul>
{held}</ul>
<h4>Try a gated page</h4>
<ul>
<li><a href="/logged-in/claim/read/foo">/logged-in/claim/read/foo</a> (needs <code>read_foo</code>)</li>
<li><a href="/logged-in/claim/write/bar">/logged-in/claim/write/bar</a> (needs <code>write_bar</code>)</li>
</ul>
<div id="showToken">
<button hx-get="/logged-in/showToken" hx-target="#showToken" hx-swap="outerHTML">Show my token</button>
</div>
<p><a href="/logout">Log out</a></p>"##,
            username = html_escape(username),
        ),
    )
}

pub fn claim_page(required: &str, permissions: &[String], subject: &str) -> String {
    let held: String = permissions
        .iter()
        .map(|p| format!("<li><code>{}</code></li>\n", html_escape(p)))
        .collect();

    page(
        "Claim check passed",
        &format!(
            r#"<h1>Access granted</h1>
<p class="subtitle">This page requires the <code>{required}</code> claim.</p>
<p>Subject: <code>{subject}</code></p>
<h4>Permissions on your token</h4>
<ul>
{held}</ul>
<a href="/logged-in">Back</a>"#,
            required = html_escape(required),
            subject = html_escape(subject),
        ),
    )
}

/// htmx fragment: the raw session token, echoed back to its owner only.
pub fn show_token_fragment(token: &str) -> String {
    format!(
        r##"<div id="hideToken">
<button hx-get="/logged-in/hideToken" hx-target="#hideToken" hx-swap="outerHTML">Hide my token</button>
<code>{}</code>
</div>"##,
        html_escape(token),
    )
}

pub fn hide_token_fragment() -> String {
    r##"<div id="showToken">
<button hx-get="/logged-in/showToken" hx-target="#showToken" hx-swap="outerHTML">Show my token</button>
</div>"##
        .to_string()
}

pub fn unauthorized_page() -> String {
    page(
        "Not logged in",
        r#"<h1>Not logged in</h1>
<p class="subtitle">You must be logged in to view that page.</p>
<a href="/?msg=missing_token">Get a login link</a>"#,
    )
}

pub fn forbidden_page(required: &str, permissions: &[String], subject: &str) -> String {
    let held = if permissions.is_empty() {
        "<li><em>none</em></li>\n".to_string()
    } else {
        permissions
            .iter()
            .map(|p| format!("<li><code>{}</code></li>\n", html_escape(p)))
            .collect()
    };

    page(
        "Missing claim",
        &format!(
            r#"<h1>Access denied</h1>
<p class="subtitle">Your token does not carry the <code>{required}</code> claim.</p>
<p>Subject: <code>{subject}</code></p>
<h4>Permissions on your token</h4>
<ul>
{held}</ul>
<a href="/?msg=missing_claim&amp;need={required}">Request a new token</a>"#,
            required = html_escape(required),
            subject = html_escape(subject),
        ),
    )
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
