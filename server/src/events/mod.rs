pub mod broadcaster;
pub mod message;
pub mod stream;

pub use broadcaster::{EventBroadcaster, Subscriber, SubscriberId};
pub use message::{Event, UserAddedEvent, USER_ADDED};
pub use stream::{StreamConnection, MAX_KEEP_ALIVE};
