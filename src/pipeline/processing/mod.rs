// Pipeline processing: harmonization, validation, and quality reporting

pub mod harmonize;
pub mod quality;
pub mod validate;
