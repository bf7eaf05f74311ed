// Market data processing modules
pub mod adx;
pub mod indicator_pipeline;
