pub mod agent_api;
pub mod parse;
pub mod request;
pub mod routes;
pub mod runtime;
