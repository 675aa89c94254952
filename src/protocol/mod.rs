//! The message model shared by every layer of the parser.

mod error;
mod fields;
mod head;
mod message;
mod role;

pub use error::ParseError;
pub use fields::Fields;
pub use head::{RequestHead, ResponseHead, Version};
pub use message::{Message, PayloadItem};
pub use role::{Role, SERVER_PROTOCOL_FIELD, SERVER_STATUS_MESSAGE_FIELD};
