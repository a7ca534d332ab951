//! Browser engine: storage, timers, classification and session hand-off.
mod engine;
mod filename;
mod layout;
mod persist;
mod session;
mod store;
mod types;

pub use engine::{EngineConfig, EngineHandle};
pub use filename::key_filename;
pub use layout::{
    decode_active, decode_tabs, encode_active, encode_tabs, load_layout, PersistedLayout,
    TabRecord, ACTIVE_TAB_KEY, TABS_KEY,
};
pub use persist::{ensure_data_dir, AtomicFileWriter};
pub use session::{LoggingSessionOpener, SessionError, SessionOpener};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use types::EngineEvent;
