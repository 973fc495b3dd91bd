pub mod contract;
pub mod diagram;
pub mod input;
pub mod operator;
pub mod propagator;
pub mod symbol;
pub mod writer;
