pub mod amortization;
pub mod project;
pub mod scenarios;
pub mod sensitivity;
