// Token deployment — request types, the Deployer trait and its HTTP client.

pub mod http;
pub mod traits;
