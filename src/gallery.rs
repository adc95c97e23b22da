// Room photo gallery: thumbnail click swaps the main image

use crate::config::Thumbnail;
use thiserror::Error;

pub const ACTIVE_THUMBNAIL_CLASSES: &str = "ring-2 ring-blue-500";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("No thumbnail at index {0}")]
    UnknownThumbnail(usize),
}

#[derive(Debug, Clone, Default)]
pub struct GalleryController {
    thumbnails: Vec<Thumbnail>,
    main_image: Option<String>,
    active: Option<usize>,
}

impl GalleryController {
    pub fn new(thumbnails: Vec<Thumbnail>, main_image: Option<String>) -> Self {
        Self {
            thumbnails,
            main_image,
            active: None,
        }
    }

    pub fn main_image(&self) -> Option<&str> {
        self.main_image.as_deref()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    pub fn select(&mut self, index: usize) -> Result<&Thumbnail, GalleryError> {
        let thumbnail = self
            .thumbnails
            .get(index)
            .ok_or(GalleryError::UnknownThumbnail(index))?;

        self.main_image = Some(thumbnail.full_image.clone());
        self.active = Some(index);
        Ok(thumbnail)
    }

    pub fn thumbnail_classes(&self, index: usize) -> &'static str {
        if self.active == Some(index) {
            ACTIVE_THUMBNAIL_CLASSES
        } else {
            ""
        }
    }
}
