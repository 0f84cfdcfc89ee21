//! Value objects - Immutable objects defined by their attributes

mod amount;
mod names;

pub use amount::Amount;
pub use names::{QuantityName, RuleTag, MAX_QUANTITY_NAME_LENGTH};
