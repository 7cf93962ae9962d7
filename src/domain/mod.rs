// Domain layer: the tabular model, column names and the ports (interfaces) the core depends on.

pub mod columns;
pub mod model;
pub mod ports;
