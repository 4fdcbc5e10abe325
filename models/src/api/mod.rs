/// All auth related endpoints: registration, login, token renewal, logout and
/// the federated login callback
pub mod auth;
/// All endpoints that relate to a user and their data
pub mod user;
