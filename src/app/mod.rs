// Application layer: concrete pipelines wiring loader, metrics, scorer and storage.

pub mod pipelines;
