// Live feed — event parsing, payload normalization and the post collection.

pub mod events;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod rules;
pub mod store;
pub mod transport;
