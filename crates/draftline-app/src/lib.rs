pub mod bootstrap;
pub mod cli;
pub mod registry;
pub mod session;
