// Wardrobe catalogue: item and rating records, their flat-file store, and
// storage for uploaded photos.

pub mod handlers;
pub mod images;
pub mod models;
pub mod store;
