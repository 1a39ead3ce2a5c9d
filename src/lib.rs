// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod loader;
pub mod logging;
pub mod menu;
pub mod question;
pub mod results;
pub mod runtime;
pub mod session;
pub mod ui;
