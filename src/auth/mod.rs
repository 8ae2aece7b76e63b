pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod session;

pub use gate::{decide, GateDecision, Requirement};
pub use session::{current_user, CurrentUser};
