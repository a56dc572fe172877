pub mod authenticated;
pub mod http_client;
pub mod single_flight;
