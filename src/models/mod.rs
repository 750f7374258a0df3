pub mod app_config;
pub mod oauth;

pub use app_config::{
    AccessTokenSettings, AppConfig, AppState, RequestTokenSettings, ServerConfig, SettingKey,
};
