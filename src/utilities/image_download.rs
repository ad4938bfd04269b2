use std::fmt;
use std::time::Duration;

use image::DynamicImage;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

const TIMEOUT: Duration = Duration::from_secs(15);
const ACCEPT_IMAGES: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

#[derive(Debug)]
pub enum DownloadError {
    RequestError(reqwest::Error),
    InvalidImage(image::ImageError),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestError(err) => write!(f, "failed to download image: {err}"),
            Self::InvalidImage(err) => write!(f, "failed to decode image: {err}"),
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(value: reqwest::Error) -> Self {
        Self::RequestError(value)
    }
}

impl From<image::ImageError> for DownloadError {
    fn from(value: image::ImageError) -> Self {
        Self::InvalidImage(value)
    }
}

pub fn http_client(user_agent: Option<&str>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(TIMEOUT);
    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build()
}

/// Downloads and decodes one image. The content type is not trusted, the format is sniffed from
/// the bytes and the result is converted to RGB.
pub async fn download_image(
    http_client: reqwest::Client,
    url: &str,
) -> Result<DynamicImage, DownloadError> {
    let response = http_client
        .get(url)
        .header(ACCEPT, ACCEPT_IMAGES)
        .send()
        .await?
        .error_for_status()?;

    if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
        log::debug!("{url} is {content_type:?}");
    }

    let bytes = response.bytes().await?;
    let image = image::load_from_memory(&bytes)?;

    Ok(DynamicImage::ImageRgb8(image.into_rgb8()))
}
