pub mod learning_history;
pub mod question;
pub mod session;
pub mod user;
pub mod word;
