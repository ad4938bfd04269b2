pub mod config;
pub mod image_download;
pub mod logchamp;
pub mod url_filter;
