pub mod config;
pub mod dispatcher;
pub mod ec2;
pub mod error;
pub mod locator;
pub mod logging;
pub mod toggler;
pub mod types;
