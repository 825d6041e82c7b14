pub mod ai;
pub mod config;
pub mod fixture;
pub mod kickoff;
pub mod types;
