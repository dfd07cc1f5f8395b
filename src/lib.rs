pub mod client;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod resolver;
pub mod results;
pub mod scheduler;
pub mod validation;
