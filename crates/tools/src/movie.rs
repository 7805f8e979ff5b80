//! `getMovie`: stub that returns mock details for a film title.

use async_trait::async_trait;
use loupe_core::error::ToolError;
use loupe_core::tool::Tool;
use serde::Serialize;
use tracing::debug;

use crate::stable_hash;

pub struct MovieLookupTool;

#[async_trait]
impl Tool for MovieLookupTool {
    fn name(&self) -> &str {
        "getMovie"
    }

    fn description(&self) -> &str {
        "Get details about a movie such as release year, director, genre and rating."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Movie title such as 'Inception' or 'Alien'"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let title = arguments["title"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'title' argument".into()))?;

        debug!(title, "Movie lookup");
        serde_json::to_value(mock_movie(title)).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MovieDetails {
    title: String,
    year: u32,
    director: &'static str,
    genre: &'static str,
    rating: f64,
    runtime_minutes: u32,
}

const DIRECTORS: [&str; 6] = [
    "Ava Lindqvist",
    "Marco Ferretti",
    "Hana Takeda",
    "Samuel Okafor",
    "Clara Dubois",
    "Diego Morales",
];

const GENRES: [&str; 6] = [
    "drama",
    "comedy",
    "science fiction",
    "thriller",
    "animation",
    "documentary",
];

fn mock_movie(title: &str) -> MovieDetails {
    let hash = stable_hash(title);
    MovieDetails {
        title: title.to_string(),
        year: 1960 + (hash % 65),
        director: DIRECTORS[(hash as usize / 3) % DIRECTORS.len()],
        genre: GENRES[(hash as usize / 11) % GENRES.len()],
        // 5.0 to 9.9
        rating: f64::from(50 + (hash % 50)) / 10.0,
        runtime_minutes: 80 + (hash % 90),
    }
}
