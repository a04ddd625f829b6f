pub mod controller;
pub mod session;
pub mod testing;
pub mod timer;
pub mod traits;
mod voice;
