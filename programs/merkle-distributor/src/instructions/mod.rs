pub mod claim;
pub mod clawback;
pub mod initialize;

pub use claim::*;
pub use clawback::*;
pub use initialize::*;
