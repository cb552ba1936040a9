// Token metadata — names and ticker symbols derived from selected text.

pub mod identifier;
pub mod ticker;
