pub mod detail;
pub mod forms;
pub mod gallery;
pub mod landing;
