//! HTML for the mock IdP's interactive pages.

use crate::api::views::html_escape;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; background: #111; color: #eee; padding: 2rem; line-height: 1.6; }}
h2 {{ color: #00d1b2; }}
.panel {{ background: #222; padding: 1rem; border-radius: 8px; border: 1px solid #444; margin-top: 1rem; }}
code {{ word-break: break-all; color: #ffdd57; }}
pre {{ color: #48c774; overflow-x: auto; }}
a {{ color: #3273dc; }}
select, textarea, button {{ font-size: 14px; padding: 8px; border-radius: 4px; border: 1px solid #444; background: #1a1a1a; color: #eee; }}
textarea {{ width: 100%; box-sizing: border-box; font-family: monospace; }}
button {{ background: #00d1b2; color: #111; border: none; cursor: pointer; margin-top: 12px; }}
</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Claim-selection form shown by the authorize endpoint. Persona mode offers
/// a fixed picker; any other mode gets a free-form JSON editor seeded with
/// the default persona.
pub fn authorize_page(
    mode: &str,
    redirect_uri: &str,
    state: &str,
    nonce: Option<&str>,
    personas: &[&str],
    default_json: &str,
) -> String {
    let is_persona = mode == "persona";

    let chooser = if is_persona {
        let options: String = personas
            .iter()
            .map(|name| {
                format!(
                    r#"<option value="{name}">{name}</option>
"#,
                    name = html_escape(name),
                )
            })
            .collect();
        format!(
            r#"<label for="persona_choice">Log in as</label><br>
<select id="persona_choice" name="persona_choice">
{options}</select>"#
        )
    } else {
        format!(
            r#"<label for="custom_claims">Identity claims (JSON object)</label><br>
<textarea id="custom_claims" name="custom_claims" rows="12">{}</textarea>"#,
            html_escape(default_json),
        )
    };

    let nonce_field = nonce
        .map(|n| {
            format!(
                r#"<input type="hidden" name="nonce" value="{}">
"#,
                html_escape(n),
            )
        })
        .unwrap_or_default();

    page(
        "Mock IdP - Authorize",
        &format!(
            r#"<h2>Mock Identity Provider</h2>
<p>A client asked us to authenticate you. Pick the identity you want to present.</p>
<div class="panel">
<form method="POST" action="/idp/{mode}/oidc/login-callback">
<input type="hidden" name="redirect_uri" value="{redirect_uri}">
<input type="hidden" name="state" value="{state}">
{nonce_field}{chooser}<br>
<button type="submit">Sign in</button>
</form>
</div>"#,
            mode = html_escape(mode),
            redirect_uri = html_escape(redirect_uri),
            state = html_escape(state),
        ),
    )
}

/// Diagnostic page showing the signed ID token and the payload it encodes,
/// as the relying party would receive them from the token endpoint.
pub fn preview_page(token: &str, payload_json: &str, code: &str) -> String {
    page(
        "Handshake Preview",
        &format!(
            r#"<h2>Handshake Preview</h2>
<p>This is what the IdP has prepared for the relying party:</p>
<div class="panel">
<h4 style="margin-top:0">1. The ID Token (Encoded)</h4>
<code>{token}</code>
</div>
<div class="panel">
<h4 style="margin-top:0">2. Decoded Payload (check <code>iss</code> and <code>aud</code>)</h4>
<pre>{payload}</pre>
</div>
<p style="margin-top:1.5rem"><strong>Next step:</strong> the relying party would call the token endpoint
with code <code>{code}</code> to retrieve this exact data.</p>
<a href="/idp">Back to dashboard</a>"#,
            token = html_escape(token),
            payload = html_escape(payload_json),
            code = html_escape(code),
        ),
    )
}

pub fn dashboard_page(persona_url: &str, expert_url: &str) -> String {
    page(
        "Mock IdP",
        &format!(
            r#"<h2>Mock Identity Provider</h2>
<p>Start an authorization-code flow that lands on the preview page instead of a real client:</p>
<div class="panel">
<p><a href="{persona_url}">Persona mode</a> - pick from canned identities</p>
<p><a href="{expert_url}">Expert mode</a> - write the claim set yourself</p>
</div>
<div class="panel">
<p>Discovery: <code>/idp/persona/.well-known/openid-configuration</code></p>
<p>Keys: <code>/idp/jwks</code></p>
</div>"#,
            persona_url = html_escape(persona_url),
            expert_url = html_escape(expert_url),
        ),
    )
}
