use serde::Serialize;
use url::Url;

/// How a stored `video_url` should be played back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Playback {
    /// Embeddable preview page (Google Drive file links)
    Embed(String),
    /// Played as-is
    Direct(String),
}

impl Playback {
    /// Drive share links of the form `.../file/d/<id>/...` become the preview embed URL
    pub fn for_url(video_url: &str) -> Playback {
        match drive_file_id(video_url) {
            Some(id) => Playback::Embed(format!("https://drive.google.com/file/d/{}/preview", id)),
            None => Playback::Direct(video_url.to_string()),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Playback::Embed(url) | Playback::Direct(url) => url,
        }
    }
}

fn drive_file_id(video_url: &str) -> Option<String> {
    let url = Url::parse(video_url).ok()?;
    if url.host_str()? != "drive.google.com" {
        return None;
    }

    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "d")?;
    segments.next().filter(|id| !id.is_empty()).map(str::to_string)
}
