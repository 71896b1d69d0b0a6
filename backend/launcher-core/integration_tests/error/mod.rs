mod launch;
mod spawn;
