// Domain layer: protocol types and ports (adapter protocol, backend capabilities).

pub mod model;
pub mod ports;
