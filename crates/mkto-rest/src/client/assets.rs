//! Asset endpoints: folders, static lists, and smart lists.
//!
//! Assets live under the `/rest/asset/v1/` prefix and paginate with
//! `offset` / `maxReturn` instead of paging tokens. `maxReturn` is capped
//! at 200 by the vendor.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{MarketoRestClient, MAX_ASSET_RETURN};
use crate::types::Page;

/// The two folder flavors. Programs double as folders in the asset tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FolderType {
    Folder,
    Program,
}

impl FolderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::Folder => "Folder",
            FolderType::Program => "Program",
        }
    }
}

/// Reference to a folder, used as a parent or scope parameter. Some
/// endpoints take it as a JSON-encoded string parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FolderRef {
    pub id: i64,
    #[serde(rename = "type")]
    pub folder_type: FolderType,
}

impl FolderRef {
    pub fn folder(id: i64) -> Self {
        Self {
            id,
            folder_type: FolderType::Folder,
        }
    }

    pub fn program(id: i64) -> Self {
        Self {
            id,
            folder_type: FolderType::Program,
        }
    }

    fn to_param(self) -> String {
        json!({"id": self.id, "type": self.folder_type.as_str()}).to_string()
    }
}

/// A folder in the asset tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_id: Option<serde_json::Value>,
    #[serde(default)]
    pub folder_type: Option<String>,
    #[serde(default)]
    pub parent: Option<serde_json::Value>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub is_archive: Option<bool>,
    #[serde(default)]
    pub is_system: Option<bool>,
    #[serde(default)]
    pub access_zone_id: Option<i64>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A static list asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticList {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder: Option<serde_json::Value>,
    #[serde(default)]
    pub workspace_id: Option<i64>,
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default)]
    pub computed_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A smart list asset. `rules` is populated only when requested.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartList {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder: Option<serde_json::Value>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rules: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl MarketoRestClient {
    fn check_max_return(&self, max_return: Option<usize>) -> Result<()> {
        if let Some(max_return) = max_return {
            self.check_input_len("maxReturn", max_return, MAX_ASSET_RETURN)?;
        }
        Ok(())
    }

    /// Create a folder under the given parent.
    #[instrument(skip(self, description))]
    pub async fn create_folder(
        &self,
        name: &str,
        parent: FolderRef,
        description: Option<&str>,
    ) -> Result<Vec<Folder>> {
        let mut body = json!({"name": name, "parent": parent});
        if let Some(description) = description {
            body["description"] = json!(description);
        }

        let url = self.inner().asset_url("folders.json");
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Retrieve a page of folders under a root, down to `max_depth` levels.
    ///
    /// Asset listings paginate by `offset`, not tokens: the returned page
    /// never carries `next_page_token`/`more_result`, and an empty page
    /// signals the end.
    pub async fn get_folders(
        &self,
        root: Option<FolderRef>,
        max_depth: Option<usize>,
        max_return: Option<usize>,
        offset: Option<usize>,
        workspace: Option<&str>,
    ) -> Result<Page<Folder>> {
        self.check_max_return(max_return)?;

        let url = self.inner().asset_url("folders.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("root", root.map(FolderRef::to_param))
            .query_opt("maxDepth", max_depth)
            .query_opt("maxReturn", max_return)
            .query_opt("offset", offset)
            .query_opt("workSpace", workspace);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve a folder by id.
    pub async fn get_folder_by_id(
        &self,
        folder_id: i64,
        folder_type: FolderType,
    ) -> Result<Option<Folder>> {
        let url = self.inner().asset_url(&format!("folder/{folder_id}.json"));
        let request = self.inner().get(url).query("type", folder_type.as_str());
        let envelope = self.inner().send(request).await?;
        envelope.first_as()
    }

    /// Retrieve a folder by name, optionally scoped to a root folder, type,
    /// or workspace.
    pub async fn get_folder_by_name(
        &self,
        name: &str,
        folder_type: Option<FolderType>,
        root: Option<FolderRef>,
        workspace: Option<&str>,
    ) -> Result<Vec<Folder>> {
        let url = self.inner().asset_url("folder/byName.json");
        let request = self
            .inner()
            .get(url)
            .query("name", name)
            .query_opt("type", folder_type.map(|t| t.as_str()))
            .query_opt("root", root.map(FolderRef::to_param))
            .query_opt("workSpace", workspace);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Retrieve a page of a folder's contents. Items are heterogeneous
    /// asset records, each with a `type` field.
    pub async fn get_folder_contents(
        &self,
        folder_id: i64,
        folder_type: FolderType,
        max_return: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Page<serde_json::Value>> {
        self.check_max_return(max_return)?;

        let url = self
            .inner()
            .asset_url(&format!("folder/{folder_id}/content.json"));
        let request = self
            .inner()
            .get(url)
            .query("type", folder_type.as_str())
            .query_opt("maxReturn", max_return)
            .query_opt("offset", offset);
        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Update a folder's name, description, or archival state.
    pub async fn update_folder(
        &self,
        folder_id: i64,
        folder_type: FolderType,
        name: Option<&str>,
        description: Option<&str>,
        is_archive: Option<bool>,
    ) -> Result<Vec<Folder>> {
        let url = self.inner().asset_url(&format!("folder/{folder_id}.json"));
        let request = self
            .inner()
            .post(url)
            .query("type", folder_type.as_str())
            .query_opt("name", name)
            .query_opt("description", description)
            .query_opt("isArchive", is_archive);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete an empty folder.
    pub async fn delete_folder(
        &self,
        folder_id: i64,
        folder_type: FolderType,
    ) -> Result<Vec<Folder>> {
        let url = self
            .inner()
            .asset_url(&format!("folder/{folder_id}/delete.json"));
        let request = self
            .inner()
            .post(url)
            .json_value(json!({"type": folder_type.as_str()}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Create a static list in a folder. This endpoint takes a url-encoded
    /// form with the folder reference JSON-encoded inside it.
    #[instrument(skip(self, description))]
    pub async fn create_static_list(
        &self,
        name: &str,
        folder_id: i64,
        description: Option<&str>,
    ) -> Result<Vec<StaticList>> {
        let mut fields = vec![
            ("name".to_string(), name.to_string()),
            ("folder".to_string(), FolderRef::folder(folder_id).to_param()),
        ];
        if let Some(description) = description {
            fields.push(("description".to_string(), description.to_string()));
        }

        let url = self.inner().asset_url("staticLists.json");
        let request = self.inner().post(url).form(fields);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Retrieve a static list by id.
    pub async fn get_static_list_by_id(&self, list_id: i64) -> Result<Option<StaticList>> {
        let url = self.inner().asset_url(&format!("staticList/{list_id}.json"));
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a static list by exact name.
    pub async fn get_static_list_by_name(&self, name: &str) -> Result<Option<StaticList>> {
        let url = self.inner().asset_url("staticList/byName.json");
        let request = self.inner().get(url).query("name", name);
        let envelope = self.inner().send(request).await?;
        envelope.first_as()
    }

    /// Retrieve a page of static lists, optionally scoped to a folder or an
    /// update-time window. Advance with `offset`; an empty page signals the
    /// end (`more_result` is never set by asset endpoints).
    pub async fn get_static_lists(
        &self,
        folder: Option<FolderRef>,
        max_return: Option<usize>,
        offset: Option<usize>,
        earliest_updated_at: Option<&str>,
        latest_updated_at: Option<&str>,
    ) -> Result<Page<StaticList>> {
        self.check_max_return(max_return)?;

        let url = self.inner().asset_url("staticLists.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("folder", folder.map(FolderRef::to_param))
            .query_opt("maxReturn", max_return)
            .query_opt("offset", offset)
            .query_opt("earliestUpdatedAt", earliest_updated_at)
            .query_opt("latestUpdatedAt", latest_updated_at);
        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Rename a static list or change its description.
    pub async fn update_static_list(
        &self,
        list_id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Vec<StaticList>> {
        let url = self.inner().asset_url(&format!("staticList/{list_id}.json"));
        let request = self
            .inner()
            .post(url)
            .query_opt("name", name)
            .query_opt("description", description);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete a static list.
    pub async fn delete_static_list(&self, list_id: i64) -> Result<Vec<StaticList>> {
        let url = self
            .inner()
            .asset_url(&format!("staticList/{list_id}/delete.json"));
        let envelope = self.inner().send(self.inner().post(url)).await?;
        envelope.results_as()
    }

    /// Retrieve a smart list by id, optionally including its rule tree.
    pub async fn get_smart_list_by_id(
        &self,
        list_id: i64,
        include_rules: bool,
    ) -> Result<Option<SmartList>> {
        let url = self.inner().asset_url(&format!("smartList/{list_id}.json"));
        let request = self.inner().get(url).query("includeRules", include_rules);
        let envelope = self.inner().send(request).await?;
        envelope.first_as()
    }

    /// Retrieve a smart list by exact name.
    pub async fn get_smart_list_by_name(&self, name: &str) -> Result<Option<SmartList>> {
        let url = self.inner().asset_url("smartList/byName.json");
        let request = self.inner().get(url).query("name", name);
        let envelope = self.inner().send(request).await?;
        envelope.first_as()
    }

    /// Retrieve a page of smart lists. Advance with `offset`; an empty page
    /// signals the end (`more_result` is never set by asset endpoints).
    pub async fn get_smart_lists(
        &self,
        folder: Option<FolderRef>,
        max_return: Option<usize>,
        offset: Option<usize>,
        earliest_updated_at: Option<&str>,
        latest_updated_at: Option<&str>,
    ) -> Result<Page<SmartList>> {
        self.check_max_return(max_return)?;

        let url = self.inner().asset_url("smartLists.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("folder", folder.map(FolderRef::to_param))
            .query_opt("maxReturn", max_return)
            .query_opt("offset", offset)
            .query_opt("earliestUpdatedAt", earliest_updated_at)
            .query_opt("latestUpdatedAt", latest_updated_at);
        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Clone a smart list into a folder under a new name.
    #[instrument(skip(self, description))]
    pub async fn clone_smart_list(
        &self,
        list_id: i64,
        name: &str,
        folder: FolderRef,
        description: Option<&str>,
    ) -> Result<Vec<SmartList>> {
        let mut body = json!({"name": name, "folder": folder});
        if let Some(description) = description {
            body["description"] = json!(description);
        }

        let url = self
            .inner()
            .asset_url(&format!("smartList/{list_id}/clone.json"));
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete a smart list.
    pub async fn delete_smart_list(&self, list_id: i64) -> Result<Vec<SmartList>> {
        let url = self
            .inner()
            .asset_url(&format!("smartList/{list_id}/delete.json"));
        let envelope = self.inner().send(self.inner().post(url)).await?;
        envelope.results_as()
    }
}
