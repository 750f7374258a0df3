pub mod authorize_handler;
pub mod callback_handler;

pub use authorize_handler::{authorize, authorize_handler};
pub use callback_handler::{access_token, callback_handler, resolve_redirect};
