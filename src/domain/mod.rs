// Domain layer: entities, transfer shapes and the ports the pipelines talk to.

pub mod dto;
pub mod model;
pub mod ports;
