pub mod wikipedia;

pub use wikipedia::WikipediaImages;
