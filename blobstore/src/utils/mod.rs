pub mod cli;
pub mod jwt;
pub mod state;
pub mod validation;
