mod room;

pub use room::{InMemoryRoomRepository, MAX_ID_ATTEMPTS};
