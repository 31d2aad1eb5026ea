mod extract;
mod hydrator;

pub use hydrator::Hydrator;
