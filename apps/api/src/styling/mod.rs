// Styling engine: deterministic outfit composition and rating, plus the
// optional text-generation advisor that sits in front of the composer.

pub mod advisor;
pub mod composer;
pub mod handlers;
pub mod prompts;
pub mod rater;
