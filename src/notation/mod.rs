pub mod layout;
pub mod rhythm;
pub mod transition;
