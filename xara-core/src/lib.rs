pub mod config;
pub mod error;
pub mod feedback;
pub mod intent;
pub mod phone;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use error::*;
pub use feedback::*;
pub use intent::*;
pub use phone::*;
pub use text::*;
pub use types::*;
