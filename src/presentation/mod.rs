pub mod demo;
pub mod views;
