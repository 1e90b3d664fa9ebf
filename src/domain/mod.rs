pub mod dispatch;
pub mod forecast;
pub mod hardware;

pub use dispatch::*;
pub use forecast::*;
pub use hardware::*;
