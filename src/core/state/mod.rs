// Download cursor management

pub mod manager;

pub use manager::StateManager;
