pub mod analytics_handlers;
pub mod application_handlers;
pub mod auth_handlers;
pub mod cv_handlers;
pub mod notification_handlers;
pub mod system_handlers;

pub use analytics_handlers::*;
pub use application_handlers::*;
pub use auth_handlers::*;
pub use cv_handlers::*;
pub use notification_handlers::*;
pub use system_handlers::*;
