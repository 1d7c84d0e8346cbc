mod sleep_provider;
mod tokio;

pub use self::tokio::*;
pub use sleep_provider::*;
