pub mod mailer;
pub mod object_store;
pub mod token_codec;
