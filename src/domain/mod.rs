// Domain layer: models, request types, resource catalog and ports (interfaces).

pub mod http;
pub mod model;
pub mod ports;
pub mod resources;
