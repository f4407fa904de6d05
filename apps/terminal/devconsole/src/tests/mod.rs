mod app;
mod console;
mod error;
