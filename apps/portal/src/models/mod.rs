pub mod document;
pub mod jobs;
pub mod profile;
