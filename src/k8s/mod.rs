//! Kubernetes operations

pub mod kubectl;
