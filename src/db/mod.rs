pub mod board_store;
pub mod connection;

pub use connection::Database;
