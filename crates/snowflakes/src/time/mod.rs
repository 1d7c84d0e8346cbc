mod interface;
mod mono_clock;
mod system;
mod time_travel;

pub use interface::*;
pub use mono_clock::*;
pub use system::*;
pub use time_travel::*;
