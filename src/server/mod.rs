//! Preview server that resolves pages on request

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::build::watch_changes;
use crate::content::ContentCollection;
use crate::generator::Generator;
use crate::resolver::{PageResolver, Resolution};
use crate::schema::{DocumentType, SchemaRegistry};
use crate::Site;

/// A request path mapped onto the site's pages
#[derive(Debug, Clone)]
pub enum SitePath<'a> {
    /// Listing page of a type; `None` is the home listing
    Listing {
        doc_type: Option<&'a DocumentType>,
        page: usize,
    },
    /// Detail page of a document
    Detail {
        doc_type: &'a DocumentType,
        slug: String,
    },
    /// Nothing lives here
    Unknown,
}

impl PartialEq for SitePath<'_> {
    fn eq(&self, other: &Self) -> bool {
        let name = |t: &DocumentType| t.name().to_string();
        match (self, other) {
            (
                SitePath::Listing { doc_type: a, page: p },
                SitePath::Listing { doc_type: b, page: q },
            ) => a.map(name) == b.map(name) && p == q,
            (
                SitePath::Detail { doc_type: a, slug: s },
                SitePath::Detail { doc_type: b, slug: t },
            ) => a.name() == b.name() && s == t,
            (SitePath::Unknown, SitePath::Unknown) => true,
            _ => false,
        }
    }
}

impl<'a> SitePath<'a> {
    /// Map a request path under `root` to a page
    pub fn parse(path: &str, root: &str, registry: &'a SchemaRegistry) -> Self {
        let Some(path) = strip_root(path, root) else {
            return SitePath::Unknown;
        };
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();

        // Longest route first so `podcast/episodes` wins over `podcast`
        let mut routed: Vec<(&DocumentType, Vec<&str>)> = registry
            .types()
            .map(|t| (t, t.route().split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>()))
            .filter(|(_, route)| !route.is_empty())
            .collect();
        routed.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        for (doc_type, route) in &routed {
            if let Some(rest) = segments.strip_prefix(route.as_slice()) {
                match Self::parse_rest(rest, Some(*doc_type)) {
                    SitePath::Unknown => continue,
                    found => return found,
                }
            }
        }

        Self::parse_rest(&segments, None)
    }

    /// Segments after a type's route, or the whole path for the home listing
    fn parse_rest(rest: &[&str], doc_type: Option<&'a DocumentType>) -> Self {
        let page_num = |n: &str| n.parse::<usize>().ok().filter(|n| *n > 0);

        match (rest, doc_type) {
            ([], _) => SitePath::Listing { doc_type, page: 1 },
            (["page", n], _) => match page_num(n) {
                Some(page) => SitePath::Listing { doc_type, page },
                None => SitePath::Unknown,
            },
            ([slug], Some(doc_type)) => SitePath::Detail {
                doc_type,
                slug: slug.to_string(),
            },
            _ => SitePath::Unknown,
        }
    }
}

/// The request path below the site root; `None` when it lies outside
fn strip_root<'p>(path: &'p str, root: &str) -> Option<&'p str> {
    let root = root.trim_matches('/');
    if root.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix('/').unwrap_or(path).strip_prefix(root)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Render the page for a request path; `None` when nothing lives there
pub fn render_path(
    site: &Site,
    registry: &SchemaRegistry,
    collection: &ContentCollection,
    generator: &Generator<'_>,
    path: &str,
) -> Result<Option<String>> {
    match SitePath::parse(path, &site.config.root, registry) {
        SitePath::Listing { doc_type, page } => {
            let (doc_type, is_home) = match doc_type {
                Some(doc_type) => (doc_type, false),
                None => match site.home_type(registry) {
                    Some(doc_type) => (doc_type, true),
                    None => return Ok(None),
                },
            };
            let resolver = PageResolver::new(collection, doc_type);
            generator.render_listing(&resolver, page, is_home)
        }
        SitePath::Detail { doc_type, slug } => {
            let resolver = PageResolver::new(collection, doc_type);
            match resolver.resolve(&slug) {
                Resolution::Found(record) => generator.render_detail(&resolver, record).map(Some),
                Resolution::NotFound => Ok(None),
            }
        }
        SitePath::Unknown => Ok(None),
    }
}

/// Server state
struct ServerState {
    site: Site,
    registry: SchemaRegistry,
    collection: RwLock<Arc<ContentCollection>>,
}

impl ServerState {
    fn collection(&self) -> Arc<ContentCollection> {
        match self.collection.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    fn replace_collection(&self, collection: ContentCollection) {
        let mut guard = match self.collection.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(collection);
    }

    /// Reload content after a change; document errors are logged, not fatal
    fn reload(&self) {
        match self.site.load(&self.registry) {
            Ok(report) => {
                for error in &report.errors {
                    tracing::warn!("{}", error);
                }
                tracing::info!("Reloaded {} document(s)", report.collection.len());
                self.replace_collection(report.collection);
            }
            Err(e) => tracing::error!("Reload failed: {:#}", e),
        }
    }
}

/// Start the preview server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let registry = site.registry()?;
    let report = site.load(&registry)?;
    for error in &report.errors {
        tracing::warn!("{}", error);
    }

    let state = Arc::new(ServerState {
        site: site.clone(),
        registry,
        collection: RwLock::new(Arc::new(report.collection)),
    });

    let app = Router::new()
        .fallback(fallback_handler)
        .with_state(Arc::clone(&state))
        .layer(TraceLayer::new_for_http());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Watching {} for changes...", site.content_dir.display());
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watch_state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            let site = watch_state.site.clone();
            if let Err(e) = watch_changes(&site, || watch_state.reload()) {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve pages, then static assets, then the 404 page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();
    let collection = state.collection();

    let generator = match Generator::new(&state.site, &state.registry) {
        Ok(generator) => generator,
        Err(e) => return server_error(e),
    };

    match render_path(&state.site, &state.registry, &collection, &generator, &path) {
        Ok(Some(html)) => return Html(html).into_response(),
        Ok(None) => {}
        Err(e) => return server_error(e),
    }

    let local = strip_root(&path, &state.site.config.root).and_then(|p| p.parse::<Uri>().ok());
    if let (Some(uri), true) = (local, state.site.static_dir.is_dir()) {
        *request.uri_mut() = uri;
        let mut service = ServeDir::new(&state.site.static_dir);
        if let Ok(response) = service.try_call(request).await {
            if response.status() != StatusCode::NOT_FOUND {
                return response.into_response();
            }
        }
    }

    match generator.render_not_found(&path) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => server_error(e),
    }
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("{:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
