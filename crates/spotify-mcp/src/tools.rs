//! Tool registry for MCP tools.
//!
//! The set of tools is closed: [`SpotifyTool`] enumerates every operation the
//! server exposes, and [`ToolRegistry`] is the static list of their
//! definitions returned by `tools/list`.

use crate::protocol::ToolDefinition;
use serde_json::{Value, json};
use spotify_api::{PlayRequest, SearchType};
use std::fmt;

/// Default page size for `spotify.search`.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Text returned by the search tool when `q` or `type` is missing.
pub const MISSING_SEARCH_PARAMS: &str = "Missing required parameters q and type";

/// Confirmation returned by `spotify.play`.
pub const PLAY_CONFIRMATION: &str = "Playback started/resumed.";

/// Confirmation returned by `spotify.pause`.
pub const PAUSE_CONFIRMATION: &str = "Playback paused.";

/// Operations exposed as MCP tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotifyTool {
    Search,
    Play,
    Pause,
}

impl SpotifyTool {
    /// All tools, in listing order.
    pub const ALL: [SpotifyTool; 3] = [SpotifyTool::Search, SpotifyTool::Play, SpotifyTool::Pause];

    pub fn name(&self) -> &'static str {
        match self {
            SpotifyTool::Search => "spotify.search",
            SpotifyTool::Play => "spotify.play",
            SpotifyTool::Pause => "spotify.pause",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            SpotifyTool::Search => {
                "Search Spotify for tracks, artists, or albums. Params: q (query), type (track|artist|album), limit (1-50) default 10."
            }
            SpotifyTool::Play => {
                "Start or resume playback on the user's active device. Params: uris (array of track URIs) or context_uri."
            }
            SpotifyTool::Pause => "Pause playback on the user's active device.",
        }
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            SpotifyTool::Search => json!({
                "type": "object",
                "properties": {
                    "q": { "type": "string" },
                    "type": { "type": "string", "enum": ["track", "artist", "album"] },
                    "limit": { "type": "number", "minimum": 1, "maximum": 50, "default": 10 }
                },
                "required": ["q", "type"]
            }),
            SpotifyTool::Play => json!({
                "type": "object",
                "properties": {
                    "uris": { "type": "array", "items": { "type": "string" } },
                    "context_uri": { "type": "string" },
                    "position_ms": { "type": "number" }
                }
            }),
            SpotifyTool::Pause => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }

    /// Turn raw call arguments into a typed call.
    ///
    /// Absent arguments (`null`) are treated as an empty object.
    pub fn parse_arguments(&self, arguments: &Value) -> Result<ToolCall, ArgumentError> {
        let empty = json!({});
        let arguments = if arguments.is_null() { &empty } else { arguments };

        match self {
            SpotifyTool::Search => {
                let query = arguments
                    .get("q")
                    .and_then(Value::as_str)
                    .filter(|q| !q.is_empty());
                let kind = arguments
                    .get("type")
                    .filter(|t| !t.is_null() && t.as_str() != Some(""));
                let (Some(query), Some(_)) = (query, kind) else {
                    return Err(ArgumentError::MissingSearchParams);
                };

                self.validate(arguments)?;

                let kind = arguments["type"]
                    .as_str()
                    .and_then(|t| t.parse::<SearchType>().ok())
                    .ok_or_else(|| self.invalid("type must be one of track, artist, album"))?;

                let limit = match arguments.get("limit") {
                    None | Some(Value::Null) => DEFAULT_SEARCH_LIMIT,
                    Some(limit) => integral(limit)
                        .ok_or_else(|| self.invalid("limit must be an integer"))?,
                };

                Ok(ToolCall::Search(SearchArgs {
                    query: query.to_string(),
                    kind,
                    limit,
                }))
            }
            SpotifyTool::Play => {
                self.validate(arguments)?;
                let request: PlayRequest = serde_json::from_value(arguments.clone())
                    .map_err(|e| self.invalid(e.to_string()))?;
                Ok(ToolCall::Play(request))
            }
            SpotifyTool::Pause => Ok(ToolCall::Pause),
        }
    }

    /// Check arguments against the declared input schema.
    fn validate(&self, arguments: &Value) -> Result<(), ArgumentError> {
        let schema = self.input_schema();
        let validator = jsonschema::draft202012::options()
            .build(&schema)
            .map_err(|e| ArgumentError::Schema(format!("{}: {}", self.name(), e)))?;

        let problems: Vec<String> = validator
            .iter_errors(arguments)
            .map(|e| e.to_string())
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(self.invalid(problems.join("; ")))
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ArgumentError {
        ArgumentError::Invalid {
            tool: self.name(),
            reason: reason.into(),
        }
    }
}

/// A JSON number with no fractional part, e.g. `10` or `10.0`.
fn integral(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f as u32)
}

impl fmt::Display for SpotifyTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments of a validated `spotify.search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub query: String,
    pub kind: SearchType,
    pub limit: u32,
}

/// A tool call with typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Search(SearchArgs),
    Play(PlayRequest),
    Pause,
}

/// Why a tool's arguments were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// `q` or `type` missing from a search.
    MissingSearchParams,
    /// Arguments violate the declared schema.
    Invalid { tool: &'static str, reason: String },
    /// A declared schema failed to compile.
    Schema(String),
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::MissingSearchParams => f.write_str(MISSING_SEARCH_PARAMS),
            ArgumentError::Invalid { tool, reason } => {
                write!(f, "Invalid arguments for {}: {}", tool, reason)
            }
            ArgumentError::Schema(reason) => write!(f, "invalid tool schema {}", reason),
        }
    }
}

/// Registry of available MCP tools.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create the registry of built-in tools.
    pub fn new() -> Self {
        Self {
            tools: SpotifyTool::ALL.iter().map(SpotifyTool::definition).collect(),
        }
    }

    /// List all tools.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
