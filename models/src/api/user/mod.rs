mod dashboard;
mod manage_users;
mod profile;

pub use self::{dashboard::*, manage_users::*, profile::*};
