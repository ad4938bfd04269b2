use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use collage::{Style, text};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use time::OffsetDateTime;
use utilities::config::Config;
use utilities::{image_download, logchamp, url_filter};

mod collage;
mod utilities;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(err) = logchamp::init() {
        eprintln!("{err}");
    }

    dotenvy::dotenv().ok();

    match run(env::args().skip(1).collect()).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("failed to create collage: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(arguments: Vec<String>) -> Result<PathBuf, BoxError> {
    // before any worker threads exist, the local offset is unavailable afterwards
    let date = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date();
    let config = Config::from_env()?;

    if arguments.is_empty() {
        Err("usage: carousel-collage <image url>...")?;
    }

    let valid_urls = arguments
        .iter()
        .filter(|url| {
            let valid = url_filter::is_valid_url(url);
            if !valid {
                log::warn!("invalid URL provided: {url}");
            }
            valid
        })
        .collect::<Vec<_>>();

    if valid_urls.is_empty() {
        Err("no valid URLs provided")?;
    }

    let urls = url_filter::extract_instagram_urls(&valid_urls);
    if urls.is_empty() {
        Err("no valid Instagram image URLs found")?;
    }

    log::info!("creating collage from {} images", urls.len());

    let http_client = image_download::http_client(config.user_agent.as_deref())?;
    let tasks = urls
        .into_iter()
        .map(|url| {
            let http_client = http_client.clone();
            tokio::spawn(async move {
                let result = image_download::download_image(http_client, url.as_str()).await;
                (url, result)
            })
        })
        .collect::<Vec<_>>();

    let mut images = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await? {
            (_, Ok(image)) => images.push(image),
            (url, Err(err)) => log::warn!("skipping {url}: {err}"),
        }
    }

    if images.is_empty() {
        Err("failed to download any valid images")?;
    }

    let font = text::find_font(config.font.as_deref()).ok_or("no usable font")?;
    let max_size = (config.max_width, config.max_height);
    let collage = tokio::task::spawn_blocking(move || {
        let style = Style { font: &font, date };
        collage::build_collage(&images, max_size, &style, &mut rand::rng())
    })
    .await??;

    save(&collage, &config)
}

fn save(collage: &RgbImage, config: &Config) -> Result<PathBuf, BoxError> {
    fs::create_dir_all(&config.output_dir)?;

    let path = config.output_dir.join(format!("collage_{:032x}.jpg", rand::random::<u128>()));
    let file = BufWriter::new(File::create(&path)?);
    JpegEncoder::new_with_quality(file, config.jpeg_quality).encode_image(collage)?;

    log::info!("collage saved to {}", path.display());
    Ok(path)
}
