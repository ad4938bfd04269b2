use reqwest::Url;

const INSTAGRAM_HOSTS: [&str; 2] = ["fbcdn.net", "cdninstagram.com"];
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
/// CDN query marker of images served as JPEG regardless of the path
const JPEG_STP: &str = "stp=dst-jpg";

/// whether `url` parses and has both a scheme and a host
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|url| url.has_host())
}

fn is_instagram_host(host: &str) -> bool {
    INSTAGRAM_HOSTS.iter().any(|domain| {
        host.strip_suffix(domain).is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
    })
}

fn has_image_extension(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, extension)| {
        IMAGE_EXTENSIONS.iter().any(|image| extension.eq_ignore_ascii_case(image))
    })
}

/// parses `url` if it points at an image on the Instagram CDN
pub fn instagram_image_url(url: &str) -> Option<Url> {
    let url = Url::parse(url).ok()?;
    if !matches!(url.scheme(), "http" | "https") || !url.host_str().is_some_and(is_instagram_host)
    {
        return None;
    }

    if has_image_extension(url.path()) || url.query().is_some_and(|query| query.contains(JPEG_STP))
    {
        Some(url)
    } else {
        None
    }
}

/// `http(s)://` links inside `text`, each running until the next whitespace
fn embedded_urls(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices("http").filter_map(|(start, _)| {
        let candidate = &text[start..];
        if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
            return None;
        }

        let end = candidate.find(char::is_whitespace).unwrap_or(candidate.len());
        Some(&candidate[..end])
    })
}

/// Keeps Instagram CDN image URLs, including ones embedded in a longer string. Order is kept and
/// duplicates are dropped.
pub fn extract_instagram_urls<S: AsRef<str>>(urls: &[S]) -> Vec<Url> {
    let mut found = Vec::<Url>::new();

    for url in urls {
        let url = url.as_ref().trim();
        let direct = instagram_image_url(url);
        let candidates = match direct {
            Some(url) => vec![url],
            None => embedded_urls(url).filter_map(instagram_image_url).collect(),
        };

        for candidate in candidates {
            if found.contains(&candidate) {
                continue;
            }

            log::debug!("found Instagram image URL: {candidate}");
            found.push(candidate);
        }
    }

    log::debug!("extracted {} Instagram image URLs", found.len());
    found
}
