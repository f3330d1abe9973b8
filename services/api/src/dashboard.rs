//! HTML dashboard for humans setting up the mobile client

use std::net::IpAddr;

use axum::{extract::State, response::Html};
use axum_extra::{TypedHeader, headers::Host};
use media::CatalogEntry;
use tera::{Context, Tera};
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    routes::request_host,
    state::AppState,
};

const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>VOD Dashboard</title>
    <style>
        body { background: #000; color: #fff; font-family: sans-serif; padding: 40px; }
        .accent { color: #9B111E; }
        .card { background: #111; padding: 20px; border-radius: 12px; border: 1px solid #222; margin-bottom: 20px; }
        .ip { font-family: monospace; color: #9B111E; }
        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 20px; }
        .video { background: #0a0a0a; border-radius: 8px; overflow: hidden; border: 1px solid #222; }
        .video img, .video .blank { width: 100%; aspect-ratio: 16/9; object-fit: cover; background: #111; }
        .video-info { padding: 12px; }
        h2 { margin: 0 0 10px 0; font-size: 14px; text-transform: uppercase; letter-spacing: 1px; color: #666; }
        .btn { background: #9B111E; color: #fff; text-decoration: none; padding: 8px 16px; border-radius: 4px; display: inline-block; font-size: 12px; font-weight: bold; }
    </style>
</head>
<body>
    <h1>VOD <span class="accent">SERVER</span></h1>
    <div class="card">
        <h2>Mobile Connection Settings</h2>
        <p>Enter one of these addresses in the mobile app (port {{ port }}):</p>
        {% if ips %}{% for ip in ips %}<div class="ip">{{ ip }}</div>{% endfor %}{% else %}<div class="ip">No LAN address found</div>{% endif %}
        <div style="margin-top: 20px;">
            <a href="/api/videos" class="btn">TEST API JSON</a>
        </div>
    </div>
    <div class="grid">
        {% if videos %}{% for video in videos %}
        <div class="video">
            {% if video.thumbnail %}<img src="{{ video.thumbnail }}" alt="">{% else %}<div class="blank"></div>{% endif %}
            <div class="video-info">
                <div style="margin-bottom: 10px; font-weight: bold;">{{ video.name }}</div>
                <a href="{{ video.url }}" class="btn" target="_blank">PLAY VIDEO</a>
            </div>
        </div>
        {% endfor %}{% else %}
        <p>No videos found in {{ content_dir }}</p>
        {% endif %}
    </div>
</body>
</html>
"#;

/// Non-loopback IPv4 addresses of this machine
pub fn lan_addresses() -> Vec<String> {
    match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces
            .into_iter()
            .filter_map(|(_, ip)| match ip {
                IpAddr::V4(v4) if !v4.is_loopback() => Some(v4.to_string()),
                _ => None,
            })
            .collect(),
        Err(e) => {
            warn!("Failed to list network interfaces: {}", e);
            Vec::new()
        }
    }
}

/// Render the dashboard page
pub fn render_dashboard(
    ips: &[String],
    port: u16,
    content_dir: &str,
    videos: &[CatalogEntry],
) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("ips", ips);
    context.insert("port", &port);
    context.insert("content_dir", content_dir);
    context.insert("videos", videos);

    Tera::one_off(DASHBOARD_TEMPLATE, &context, true)
}

/// Dashboard listing LAN addresses and the catalog
pub async fn dashboard(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> ApiResult<Html<String>> {
    let host = request_host(host, &state.config);
    let videos = state.catalog.list_catalog(&host).await;
    let content_dir = state.config.content_dir.display().to_string();

    let page = render_dashboard(&lan_addresses(), state.config.port, &content_dir, &videos)
        .map_err(|e| {
            error!("Failed to render dashboard: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_dashboard_escapes_names() {
        let videos = vec![
            CatalogEntry {
                id: "a%3Cb%3E.mp4".to_string(),
                name: "a<b>.mp4".to_string(),
                url: "http://host/content/a%3Cb%3E.mp4".to_string(),
                thumbnail: None,
            },
            CatalogEntry {
                id: "clip.mp4".to_string(),
                name: "clip.mp4".to_string(),
                url: "http://host/content/clip.mp4".to_string(),
                thumbnail: Some("http://host/thumbs/clip.mp4.jpg".to_string()),
            },
        ];

        let page = render_dashboard(&["10.0.0.5".to_string()], 3006, "vod_content", &videos)
            .unwrap();

        assert!(page.contains("10.0.0.5"));
        assert!(page.contains("a&lt;b&gt;.mp4"));
        assert!(!page.contains("a<b>.mp4"));
        assert!(page.contains("<img src="));
    }

    #[test]
    fn test_render_dashboard_without_videos() {
        let page = render_dashboard(&[], 3006, "vod_content", &[]).unwrap();
        assert!(page.contains("No videos found in vod_content"));
        assert!(page.contains("No LAN address found"));
    }
}
