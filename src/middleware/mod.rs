pub mod auth_context;
pub mod claim_gate;
