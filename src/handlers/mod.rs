pub mod admin_handlers;
pub mod directory_handlers;
pub mod join_handlers;
pub mod manifest_handlers;
pub mod profile_handlers;

pub use admin_handlers::admin_dashboard;
pub use directory_handlers::directory_page;
pub use join_handlers::{join_login_handler, join_page, join_submit_handler};
pub use manifest_handlers::manifest_handler;
pub use profile_handlers::{edit_profile_page, update_profile_handler};
