pub mod account_service;
pub mod credential_service;
pub mod mailer;
pub mod session_service;
pub mod token_service;
