// Background agents (AI switch, polling loop)
pub mod agents;

// Market data processing
pub mod market_data;

// Price predictors and feature scaling
pub mod ml;

// Advisory trade levels
pub mod risk_management;

pub mod prediction_service;

// System orchestrator
pub mod system;
