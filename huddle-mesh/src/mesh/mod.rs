mod command;
mod coordinator;
mod handle;
mod session;
mod status;

pub use command::*;
pub use coordinator::*;
pub use handle::*;
pub use session::*;
pub use status::*;
