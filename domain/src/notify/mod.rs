//! Alert message construction

mod message;

pub use message::NotificationMessage;
