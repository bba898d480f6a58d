pub mod coaching;
pub mod dashboard;
