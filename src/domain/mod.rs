// Domain layer: CRS, layer models and ports (interfaces).

pub mod crs;
pub mod model;
pub mod ports;
