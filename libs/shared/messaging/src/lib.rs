pub mod bus;

pub use bus::{EventBus, InMemoryEventBus, MessagingError, RedisEventBus};
