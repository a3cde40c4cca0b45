// Thu Oct 15 2026 - Alex

pub mod cli;
pub mod output;
