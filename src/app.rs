mod model;

pub use model::*;

#[cfg(test)]
mod tests;
