mod create_account;
mod federation;
mod login;
mod logout;
mod renew_access_token;

pub use self::{
	create_account::*,
	federation::*,
	login::*,
	logout::*,
	renew_access_token::*,
};
