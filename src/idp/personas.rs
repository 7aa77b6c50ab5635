//! Fixed identity-claim templates for the mock IdP.

use serde_json::{Map, Value, json};

pub const DEFAULT_PERSONA: &str = "default";

/// Persona names offered on the claim-selection form.
pub fn names() -> [&'static str; 2] {
    [DEFAULT_PERSONA, "admin"]
}

/// The claim template for `name`; unknown names fall back to `default`.
pub fn template(name: &str) -> Map<String, Value> {
    let value = match name {
        "admin" => json!({
            "sub": "admin-999",
            "email": "admin@example.com",
            "preferred_username": "superuser",
            "department": "Engineering",
            "roles": ["admin", "editor", "viewer"],
            "is_internal": true,
        }),
        _ => json!({
            "sub": "user-001",
            "email": "tester@example.com",
            "preferred_username": "tester",
            "department": "QA",
            "roles": ["viewer"],
        }),
    };

    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
