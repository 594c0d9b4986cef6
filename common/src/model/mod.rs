pub mod address;
pub mod document;
pub mod profile;
