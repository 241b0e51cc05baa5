// Domain layer: core models, value objects and ports (interfaces). No I/O here.

pub mod model;
pub mod money;
pub mod odds;
pub mod ports;
