// Market analysis domain
pub mod market;

// Feature layout and scaling
pub mod ml;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Core trading domain
pub mod trading;

// Domain-specific error types
pub mod errors;
