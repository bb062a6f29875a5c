//! Level 3: Feature Integration Tests

pub mod file_integrity;
