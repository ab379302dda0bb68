pub mod session;
pub mod state;
