mod bootstrap;
mod error;
