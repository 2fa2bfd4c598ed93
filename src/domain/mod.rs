pub mod checkout;
pub mod errors;
pub mod json;
pub mod payment;
pub mod ports;
pub mod sale;
pub mod shipping;
pub mod webhook;
