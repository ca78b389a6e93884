pub mod ids;
pub mod node;

pub use ids::NodeKey;
pub use node::{NodeKind, QName};
