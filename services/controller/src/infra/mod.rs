pub mod http;
pub mod users;
