// Diagnostics: per-session capture statistics.

pub mod stats;
