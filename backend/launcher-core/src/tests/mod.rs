mod launcher;
mod supervisor;
mod support;
