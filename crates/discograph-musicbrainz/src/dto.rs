//! Shapes of the `/ws/2/{artist,release}/?fmt=json` search responses.
//!
//! Only the consumed fields are declared. Everything is optional because the
//! service omits or nulls fields freely.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ArtistSearchDto {
  #[serde(default)]
  pub artists: Option<Vec<ArtistDto>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistDto {
  pub id: Option<String>,
  pub name: Option<String>,
  pub country: Option<String>,
  pub gender: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseSearchDto {
  #[serde(default)]
  pub releases: Option<Vec<ReleaseDto>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseDto {
  pub id: Option<String>,
  pub title: Option<String>,
  #[serde(rename = "release-group")]
  pub release_group: Option<ReleaseGroupDto>,
  #[serde(rename = "label-info", default)]
  pub label_info: Option<Vec<LabelInfoDto>>,
  #[serde(rename = "artist-credit", default)]
  pub artist_credit: Option<Vec<ArtistCreditDto>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseGroupDto {
  pub id: Option<String>,
  pub title: Option<String>,
  #[serde(rename = "primary-type")]
  pub primary_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LabelInfoDto {
  pub label: Option<LabelDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LabelDto {
  pub id: Option<String>,
  pub name: Option<String>,
}

/// One credited name. `name` is the credited spelling, `artist` the entity.
#[derive(Debug, Default, Deserialize)]
pub struct ArtistCreditDto {
  pub name: Option<String>,
  pub artist: Option<ArtistRefDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistRefDto {
  pub id: Option<String>,
  pub name: Option<String>,
}
