//! Best image-pair selection over a numbered dataset tree

mod naming;
mod selector;

pub use naming::PairNaming;
pub use selector::{rank, ImagePairCandidate, PairSelector, SelectError};
