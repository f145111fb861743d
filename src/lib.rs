pub mod backend;
pub mod config;
pub mod session;
pub mod signup;
pub mod state;
pub mod storage;
pub mod ui;
