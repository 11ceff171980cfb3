// Synoptic Edge application layer: mock data services, prop edge evaluation,
// the parlay slip, and the AI advisor.

pub mod advisor;
pub mod edge;
pub mod parlay;
pub mod services;
