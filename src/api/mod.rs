// Collaborator HTTP APIs — wallet import, balance and single-post lookup.

pub mod client;
pub mod links;
