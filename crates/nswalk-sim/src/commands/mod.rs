pub mod demo;
pub mod doctor;
pub mod walk;
