pub mod gate;
pub mod home_handler;
pub mod myself_handler;
pub mod oauth;
pub mod origin;

pub use gate::require_jira_access_token;
pub use home_handler::home_handler;
pub use myself_handler::myself_handler;
pub use oauth::{authorize_handler, callback_handler};
