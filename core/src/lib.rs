pub mod config;
pub mod context;
pub mod events;
pub mod model;
pub mod traits;

pub mod blocklist;
pub mod cache;
pub mod clock;
pub mod loader;
pub mod locale;
pub mod report;

pub use config::Config;
pub use context::{Collaborators, Context};
pub use events::Event;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
