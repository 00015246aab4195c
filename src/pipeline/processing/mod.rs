// Pipeline processing: inspection, type coercion, filtering and joining

pub mod filter;
pub mod inspect;
pub mod join;
pub mod normalize;
