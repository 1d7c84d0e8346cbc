mod builder;
mod cancel;
mod lock;
mod mutex;

pub use builder::*;
pub use cancel::*;
pub use lock::*;
pub(crate) use mutex::*;
