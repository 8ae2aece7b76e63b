pub mod user;

pub use user::{ProfileUpdate, User, UserListing};
