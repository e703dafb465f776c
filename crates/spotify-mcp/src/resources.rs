//! Resource registry for MCP resources.

use crate::protocol::ResourceDefinition;

const JSON_MIME_TYPE: &str = "application/json";

/// Read-only resources exposed over MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotifyResource {
    CurrentlyPlaying,
    UserProfile,
}

impl SpotifyResource {
    /// All resources, in listing order.
    pub const ALL: [SpotifyResource; 2] =
        [SpotifyResource::CurrentlyPlaying, SpotifyResource::UserProfile];

    pub fn uri(&self) -> &'static str {
        match self {
            SpotifyResource::CurrentlyPlaying => "spotify:currently-playing",
            SpotifyResource::UserProfile => "spotify:user-profile",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.uri() == uri)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpotifyResource::CurrentlyPlaying => "Currently Playing",
            SpotifyResource::UserProfile => "User Profile",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SpotifyResource::CurrentlyPlaying => "The user's currently playing item info",
            SpotifyResource::UserProfile => "Current user profile information",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        JSON_MIME_TYPE
    }

    pub fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.uri().to_string(),
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            mime_type: self.mime_type().to_string(),
        }
    }
}

/// Registry of available MCP resources.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDefinition>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Create the registry of built-in resources.
    pub fn new() -> Self {
        Self {
            resources: SpotifyResource::ALL
                .iter()
                .map(SpotifyResource::definition)
                .collect(),
        }
    }

    pub fn list(&self) -> &[ResourceDefinition] {
        &self.resources
    }
}
