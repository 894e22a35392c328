//! Cost, integration, and flow fields steering agents toward destinations.

mod cost_field;
mod flow_field;
mod integration_field;
mod registry;

pub use cost_field::CostField;
pub use flow_field::FlowField;
pub use integration_field::IntegrationField;
pub use registry::{DestinationSource, FlowFieldRegistry, NavigationLayers, RegistryState};
