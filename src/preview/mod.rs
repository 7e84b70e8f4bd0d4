// Preview pipeline: capture loop and frame publication.

pub mod capture;
pub mod slot;
