pub mod catalog;
pub mod checkout;
pub mod content;
pub mod errors;
pub mod invoice;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod report;
pub mod settings;
pub mod user;
