// Personal statement drafting: section generation, assembly, revision,
// translation and the session that ties them together.
// All model calls go through llm_client::ModelGateway.

pub mod assembler;
pub mod generator;
pub mod handlers;
pub mod header;
pub mod markers;
pub mod modules;
pub mod prompts;
pub mod reviser;
pub mod session;
pub mod translator;
