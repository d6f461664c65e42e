// Resume analysis: ATS review and job matching through the hosted model.
// Results are stored as opaque JSON; the ranker reads only a few fields back.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
pub mod store;
