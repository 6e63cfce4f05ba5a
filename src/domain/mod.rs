// Domain layer: core models, ports (interfaces) and the pure services built on them.

pub mod model;
pub mod ports;

pub mod services;
