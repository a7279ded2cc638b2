pub mod install;
pub mod projects;
pub mod repl;
