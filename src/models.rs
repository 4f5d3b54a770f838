use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub external_reference: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client-supplied fields of a movie.
///
/// Decodes from a JSON body (`externalReference`) as well as from an HTML
/// form (`external_reference`). Server-owned keys such as `id` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    #[serde(rename = "externalReference", alias = "external_reference")]
    pub external_reference: String,
}

impl From<&Movie> for MovieInput {
    fn from(movie: &Movie) -> Self {
        Self { title: movie.title.clone(), external_reference: movie.external_reference.clone() }
    }
}
