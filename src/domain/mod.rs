// Domain layer: signal/feature models and the ports the extractors and classifier depend on.

pub mod model;
pub mod ports;
