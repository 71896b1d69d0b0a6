mod error;
mod health;
mod launcher;
mod supervisor;
mod support;
