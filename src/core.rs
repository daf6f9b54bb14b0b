pub mod decision;
pub mod engine;
pub mod finalizer;
pub mod history;
pub mod interval;
pub mod mode;
pub mod model;
pub mod price;
pub mod settings;
pub mod simulator;
pub mod status;
pub mod trend;
