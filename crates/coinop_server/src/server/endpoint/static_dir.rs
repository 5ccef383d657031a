use std::path::PathBuf;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

const INDEX_FILE: &str = "index.html";

///The viewer front-end: `index.html` at the endpoint's route, and any other path no api route
/// claims looked up as an asset under the same directory.
pub(crate) struct StaticDirEndpoint {
    root: PathBuf,
}

impl StaticDirEndpoint {
    pub fn new(directory: &str) -> Self {
        let root = PathBuf::from(directory);
        if !root.join(INDEX_FILE).is_file() {
            warn!(
                "no {} in {}, viewers will get 404s",
                INDEX_FILE,
                root.display()
            );
        }
        Self { root }
    }

    pub fn apply(self, key: &str, router: Router) -> Router {
        let index = ServeFile::new(self.root.join(INDEX_FILE));
        router
            .route_service(key, index)
            .fallback_service(ServeDir::new(self.root))
    }
}
