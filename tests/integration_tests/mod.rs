// Per-module integration suites, mirroring src/
mod aggregate;
mod engine;
mod path;
mod utils;
