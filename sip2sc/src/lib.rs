pub use self::catalog::HoldMode;
pub use self::catalog::Summary;
pub use self::catalog::UnitStatus;
pub use self::client::Client;
pub use self::config::Config;
pub use self::config::ConfigBuilder;
pub use self::connection::Connection;
pub use self::error::Error;
pub use self::message::Field;
pub use self::message::FixedField;
pub use self::message::Message;
pub use self::response::FixedValue;
pub use self::response::ParsedResponse;
pub use self::response::VariableFields;
pub use self::sequence::SequenceCounter;

pub mod catalog;
pub mod checksum;
pub mod response;
pub mod spec;
pub mod util;

mod client;
mod config;
mod connection;
mod error;
mod message;
mod sequence;

#[cfg(feature = "json")]
mod message_json;

#[cfg(test)]
mod tests;
