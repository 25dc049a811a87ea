//! Resource discovery and name resolution.
//!
//! Resource listings are plain GETs returning an object whose single array is
//! keyed by the collection name (`{"files": [...]}`). Name resolution scans
//! such a listing; when several resources share a name the first one listed
//! wins.

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::{
    client::AnaplanClient,
    connection::{AuthToken, Connection},
    error::ApiError,
    http_utils::Transport,
    model::{FileResource, Model, Resource, ResourceKind, User, UserResponse, Workspace},
};

impl<T: Transport> AnaplanClient<T> {
    /// Lists the resources of one kind in the connection's model
    pub async fn list(
        &self,
        connection: &Connection,
        kind: ResourceKind,
    ) -> Result<Vec<Resource>, ApiError> {
        self.list_collection(connection, kind).await
    }

    /// Lists the model's files with their chunk counts
    pub async fn list_files(&self, connection: &Connection) -> Result<Vec<FileResource>, ApiError> {
        self.list_collection(connection, ResourceKind::Files).await
    }

    /// Looks a file up by ID in the file listing
    pub async fn file_details(
        &self,
        connection: &Connection,
        file_id: &str,
    ) -> Result<FileResource, ApiError> {
        self.list_files(connection)
            .await?
            .into_iter()
            .find(|file| file.id == file_id)
            .ok_or_else(|| ApiError::NotFound {
                kind: "file".to_string(),
                name: file_id.to_string(),
            })
    }

    /// Resolves a resource name to its ID, first match wins
    pub async fn resolve_id(
        &self,
        connection: &Connection,
        kind: ResourceKind,
        name: &str,
    ) -> Result<String, ApiError> {
        debug!("Resolving {} name '{}'", kind, name);
        let resources = self.list(connection, kind).await?;
        let id = find_id_by_name(&resources, name).ok_or_else(|| ApiError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        })?;
        trace!("Resolved '{}' to {}", name, id);
        Ok(id.to_string())
    }

    pub async fn current_user(&self, token: &AuthToken) -> Result<User, ApiError> {
        debug!("Fetching user ID...");
        let url = self.api_url("/users/me");
        let response: UserResponse = self.get_json(token, &url).await?;
        Ok(response.user)
    }

    pub async fn workspaces(
        &self,
        token: &AuthToken,
        user_id: &str,
    ) -> Result<Vec<Workspace>, ApiError> {
        debug!("Fetching workspaces...");
        let url = self.api_url(&format!("/users/{}/workspaces", user_id));
        let body: serde_json::Value = self.get_json(token, &url).await?;
        extract_array(body, "workspaces")
    }

    pub async fn models(&self, token: &AuthToken, user_id: &str) -> Result<Vec<Model>, ApiError> {
        debug!("Fetching models...");
        let url = self.api_url(&format!("/users/{}/models", user_id));
        let body: serde_json::Value = self.get_json(token, &url).await?;
        extract_array(body, "models")
    }

    async fn list_collection<R: DeserializeOwned>(
        &self,
        connection: &Connection,
        kind: ResourceKind,
    ) -> Result<Vec<R>, ApiError> {
        debug!("Fetching {}...", kind);
        let url = self.model_url(connection, &format!("/{}", kind.as_path()));
        let body: serde_json::Value = self.get_json(connection.token(), &url).await?;
        let items = extract_array(body, kind.as_path())?;
        debug!("Finished fetching {}.", kind);
        Ok(items)
    }
}

/// First ID listed under `name`; later duplicates are reported and ignored
pub fn find_id_by_name<'a>(resources: &'a [Resource], name: &str) -> Option<&'a str> {
    let mut matches = resources.iter().filter(|r| r.name == name);
    let first = matches.next()?;
    let duplicates = matches.count();
    if duplicates > 0 {
        warn!(
            "Name '{}' is shared by {} resources, using the first one ({})",
            name,
            duplicates + 1,
            first.id
        );
    }
    Some(first.id.as_str())
}

/// Pulls the array stored under `key`. Empty listings omit the key but keep `meta`.
fn extract_array<R: DeserializeOwned>(
    mut body: serde_json::Value,
    key: &str,
) -> Result<Vec<R>, ApiError> {
    let object = body
        .as_object_mut()
        .ok_or_else(|| ApiError::Protocol(format!("expected an object holding '{}'", key)))?;
    match object.remove(key) {
        Some(items) => Ok(serde_json::from_value(items)?),
        None if object.contains_key("meta") => Ok(Vec::new()),
        None => Err(ApiError::Protocol(format!("response has no '{}' array", key))),
    }
}
