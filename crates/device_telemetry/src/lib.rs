pub mod device;
pub mod domain;
pub mod location;
pub mod mqtt;
