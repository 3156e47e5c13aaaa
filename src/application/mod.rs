pub mod account_service;
pub mod catalog_service;
pub mod content_service;
pub mod order_service;
pub mod report_service;
pub mod settings_service;

#[cfg(test)]
pub(crate) mod fakes;
