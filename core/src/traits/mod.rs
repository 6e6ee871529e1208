pub mod bundle;
pub mod eligible;
pub mod process;
pub mod resolve;
pub mod trigger;
pub mod withdraw;

pub use bundle::Bundler;
pub use eligible::Eligibility;
pub use process::Processor;
pub use resolve::Resolver;
pub use trigger::Notifier;
pub use withdraw::Withdrawer;
