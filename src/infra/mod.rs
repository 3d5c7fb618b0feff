pub mod bookmarks;
pub mod neows;
