//! Transport exposures of the admin API

pub mod rest;

pub use rest::RestExposure;
