mod command;
mod signal;
mod start;
