//! Chain-agnostic relay models: progress locations, event batches and notifications.

mod location;
mod notification;

pub use location::{EventBatch, Located, MonitorState, TransactionLocation};
pub use notification::NotificationMessage;
