pub mod format;
pub mod html;
pub mod validation;
