pub mod controller;
pub mod result;
pub mod runner;
