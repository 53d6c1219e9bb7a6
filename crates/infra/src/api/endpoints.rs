//! URL layout of the remote service
//!
//! Every row and table path is scoped under the project identifier fixed at
//! construction. Segments are percent-encoded by `url`.

use rowbridge_domain::{DataAccessError, DocumentId, ProjectScope, Result, TableReference};
use url::Url;

/// Builds request URLs for one project scope
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    project: ProjectScope,
}

impl Endpoints {
    /// Parse `base_url` and bind it to `project`
    ///
    /// # Errors
    /// Returns `DataAccessError::Config` if `base_url` is not a hierarchical
    /// http(s) URL.
    pub fn new(base_url: &str, project: ProjectScope) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| DataAccessError::Config(format!("Invalid base_url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(DataAccessError::Config(format!(
                "base_url '{base_url}' must be an http(s) URL"
            )));
        }
        Ok(Self { base, project })
    }

    /// Project this client is bound to
    pub fn project(&self) -> &ProjectScope {
        &self.project
    }

    /// `POST {base}/auth/login`
    pub fn login(&self) -> Url {
        self.join(&["auth", "login"])
    }

    /// `{base}/projects/{project}/tables`
    pub fn tables(&self) -> Url {
        self.join(&["projects", self.project.as_str(), "tables"])
    }

    /// `{base}/projects/{project}/tables/{table}/rows`
    pub fn rows(&self, table: &TableReference) -> Url {
        self.join(&["projects", self.project.as_str(), "tables", table.as_str(), "rows"])
    }

    /// `{base}/projects/{project}/tables/{table}/rows/{id}`
    ///
    /// # Errors
    /// Returns `InvalidInput` when `id` would not address a single row.
    pub fn row(&self, table: &TableReference, id: &DocumentId) -> Result<Url> {
        id.validate()?;
        Ok(self.join(&[
            "projects",
            self.project.as_str(),
            "tables",
            table.as_str(),
            "rows",
            id.as_str(),
        ]))
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base is hierarchical, so this cannot fail.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
