// Application layer: pipelines that wire adapters to the core.

pub mod pipelines;
