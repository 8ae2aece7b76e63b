use super::session::CurrentUser;

pub const HOME: &str = "/";
pub const DIRECTORY: &str = "/directory";
pub const ADMIN_LOGIN: &str = "/admin-login";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";

/// Who a route is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    /// Anonymous visitors only; logged-in members go to the directory.
    Guest,
    Member,
    Admin,
    /// The admin login page: administrators skip straight to the dashboard.
    AdminLogin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    RedirectTo(&'static str),
}

/// Decide whether a request for a route with `requirement` renders or redirects.
pub fn decide(current: Option<&CurrentUser>, requirement: Requirement) -> GateDecision {
    use GateDecision::{Render, RedirectTo};

    match (requirement, current) {
        (Requirement::Public, _) => Render,

        (Requirement::Guest, None) => Render,
        (Requirement::Guest, Some(_)) => RedirectTo(DIRECTORY),

        (Requirement::Member, None) => RedirectTo(HOME),
        (Requirement::Member, Some(_)) => Render,

        (Requirement::Admin, None) => RedirectTo(ADMIN_LOGIN),
        (Requirement::Admin, Some(user)) if !user.is_admin => RedirectTo(DIRECTORY),
        (Requirement::Admin, Some(_)) => Render,

        (Requirement::AdminLogin, Some(user)) if user.is_admin => RedirectTo(ADMIN_DASHBOARD),
        (Requirement::AdminLogin, _) => Render,
    }
}
