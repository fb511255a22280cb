pub mod csv;
pub mod fixtures;
pub mod http;
